//! Level table
//!
//! One hundred levels derived from a closed-form curve of the index. The table
//! is built once on first use and never mutated.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_COUNT;

/// Background overlay drawn on top of the sky
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overlay {
    Clear,
    Forest,
    Blizzard,
}

impl Overlay {
    /// Overlays cycle with period three
    pub fn for_level(index: usize) -> Self {
        match index % 3 {
            1 => Overlay::Forest,
            2 => Overlay::Blizzard,
            _ => Overlay::Clear,
        }
    }
}

/// A theme color in HSL space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: f32,
}

impl Hsl {
    fn new(hue: usize, saturation: u8, lightness: f32) -> Self {
        Self {
            hue: (hue % 360) as u16,
            saturation,
            lightness,
        }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Static tunables for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    /// Cumulative score needed to enter the level
    pub min_score: u64,
    /// Upper bound on game speed while in this level
    pub speed_cap: f32,
    /// Divides wave spacing and delay (higher = denser)
    pub spawn_multiplier: f32,
    /// Probability that a spawned obstacle flies
    pub flying_chance: f32,
    pub sky_from: Hsl,
    pub sky_to: Hsl,
    pub ground_from: Hsl,
    pub ground_to: Hsl,
    /// Three stops of the HUD progress-bar gradient
    pub accent: [Hsl; 3],
    pub overlay: Overlay,
}

impl LevelConfig {
    /// CSS gradient for the level-progress bar
    pub fn accent_gradient(&self) -> String {
        let [a, b, c] = &self.accent;
        format!("linear-gradient(90deg, {a}, {b}, {c})")
    }
}

/// Compute the tunables for a level index (clamped to the table)
pub fn level_at(index: usize) -> LevelConfig {
    let index = index.min(LEVEL_COUNT - 1);
    let t = index as f32 / (LEVEL_COUNT - 1) as f32;
    let i = index as u64;
    let hue = (index * 11) % 360;

    LevelConfig {
        name: format!("Level {}", index + 1),
        min_score: i * 180 + i * i * 4,
        speed_cap: 2.0 + t * 3.0,
        spawn_multiplier: 1.0 + t * 0.8,
        flying_chance: (0.2 + t * 0.65).min(0.85),
        sky_from: Hsl::new(hue, 80, 90.0 - t * 20.0),
        sky_to: Hsl::new(hue + 20, 75, 75.0 - t * 25.0),
        ground_from: Hsl::new(hue + 140, 70, 40.0 - t * 10.0),
        ground_to: Hsl::new(hue + 120, 70, 55.0 - t * 15.0),
        accent: [
            Hsl::new(hue, 80, 60.0),
            Hsl::new(hue + 35, 80, 55.0),
            Hsl::new(hue + 70, 80, 60.0),
        ],
        overlay: Overlay::for_level(index),
    }
}

/// The full level table
pub fn levels() -> &'static [LevelConfig] {
    static LEVELS: OnceLock<Vec<LevelConfig>> = OnceLock::new();
    LEVELS.get_or_init(|| (0..LEVEL_COUNT).map(level_at).collect())
}

/// Highest level whose entry score does not exceed `score`
pub fn level_for_score(score: u64) -> usize {
    levels()
        .partition_point(|level| level.min_score <= score)
        .saturating_sub(1)
}

/// Entry score of the level after `index`, if any
pub fn next_level_score(index: usize) -> Option<u64> {
    levels().get(index + 1).map(|level| level.min_score)
}
