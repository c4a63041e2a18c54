//! Wave pattern generator
//!
//! A wave is a short burst of spawns sharing one pattern and cadence. The
//! level's spawn multiplier compresses both spacing and inter-wave delay, which
//! makes it the main difficulty knob.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::level::LevelConfig;

/// Game speed above this no longer makes waves harder
pub const WAVE_DIFFICULTY_CAP: f32 = 3.0;
/// Floor on the gap between wave members (world units)
pub const MIN_WAVE_SPACING: f32 = 80.0;
/// Floor on the time between waves (ms)
pub const MIN_WAVE_DELAY_MS: f32 = 550.0;
/// Stairs waves have between 3 and 5 steps
pub const MIN_STAIR_STEPS: u8 = 3;
pub const MAX_STAIR_STEPS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPattern {
    /// One to three obstacles, nothing to collect
    Wave,
    /// Two to four collectibles, no obstacles
    CollectibleCluster,
    /// Up to two of each
    Mixed,
    /// A rising staircase of platforms with a few collectibles
    Stairs,
    /// Intentional lull
    Gap,
}

impl SpawnPattern {
    pub const ALL: [SpawnPattern; 5] = [
        SpawnPattern::Wave,
        SpawnPattern::CollectibleCluster,
        SpawnPattern::Mixed,
        SpawnPattern::Stairs,
        SpawnPattern::Gap,
    ];
}

/// Declarative description of the next burst of spawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub pattern: SpawnPattern,
    pub obstacle_count: u8,
    pub collectible_count: u8,
    /// Stair steps (stairs pattern only)
    pub platform_count: u8,
    /// Horizontal distance between consecutive members
    pub spacing: f32,
    /// Time until the next wave is drawn (ms)
    pub delay_ms: u64,
}

/// Draw the next wave for the current speed and (event/phase adjusted) level
pub fn next_wave<R: Rng + ?Sized>(game_speed: f32, level: &LevelConfig, rng: &mut R) -> WaveConfig {
    let pattern = SpawnPattern::ALL[rng.random_range(0..SpawnPattern::ALL.len())];
    let platform_count = if pattern == SpawnPattern::Stairs {
        rng.random_range(MIN_STAIR_STEPS..=MAX_STAIR_STEPS)
    } else {
        0
    };
    wave_for_pattern(pattern, game_speed, level, platform_count)
}

/// Deterministic part of wave generation once the pattern is chosen
pub fn wave_for_pattern(
    pattern: SpawnPattern,
    game_speed: f32,
    level: &LevelConfig,
    platform_count: u8,
) -> WaveConfig {
    let difficulty = game_speed.min(WAVE_DIFFICULTY_CAP).max(0.0);
    let steps = difficulty.floor() as u8;
    let half_steps = (difficulty * 0.5).floor() as u8;

    let (obstacle_count, collectible_count, spacing, delay) = match pattern {
        SpawnPattern::Wave => (
            (1 + steps).min(3),
            0,
            100.0 + difficulty * 20.0,
            1200.0 - difficulty * 100.0,
        ),
        SpawnPattern::CollectibleCluster => (
            0,
            (2 + steps).min(4),
            80.0 + difficulty * 15.0,
            1000.0 - difficulty * 80.0,
        ),
        SpawnPattern::Mixed => (
            (1 + half_steps).min(2),
            (1 + half_steps).min(2),
            110.0 + difficulty * 15.0,
            1100.0 - difficulty * 90.0,
        ),
        SpawnPattern::Stairs => (0, (1 + steps).min(3), 95.0, 1400.0 - difficulty * 80.0),
        SpawnPattern::Gap => (0, 0, 0.0, 800.0),
    };

    let multiplier = level.spawn_multiplier.max(f32::EPSILON);
    WaveConfig {
        pattern,
        obstacle_count,
        collectible_count,
        platform_count,
        spacing: (spacing / multiplier).max(MIN_WAVE_SPACING),
        delay_ms: (delay / multiplier).max(MIN_WAVE_DELAY_MS) as u64,
    }
}
