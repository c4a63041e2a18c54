//! Spawn scheduler
//!
//! Materializes the active wave's slots as time passes. Slot `i` of a lane is
//! dispatched during `[i * SPAWN_SLOT_MS, i * SPAWN_SLOT_MS + SPAWN_WINDOW_MS)`
//! after the wave starts, and each `(wave, lane, slot)` is recorded in a small
//! occupancy bitset so it spawns at most once.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{
    Collectible, CollectibleKind, EntityId, Lane, Obstacle, ObstacleKind, Platform, WaveId,
};
use super::level::LevelConfig;
use super::wave::{SpawnPattern, WaveConfig, next_wave};
use crate::consts::*;

/// Occupied slots of one lane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSet(u32);

impl SlotSet {
    /// Mark a slot; false if it was already taken
    pub fn insert(&mut self, slot: u8) -> bool {
        let bit = 1u32 << slot.min(31);
        let fresh = self.0 & bit == 0;
        self.0 |= bit;
        fresh
    }

    pub fn contains(&self, slot: u8) -> bool {
        self.0 & (1u32 << slot.min(31)) != 0
    }

    pub fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// The wave currently being dispatched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveWave {
    pub id: WaveId,
    pub config: WaveConfig,
    pub started_at: u64,
    pub obstacles: SlotSet,
    pub collectibles: SlotSet,
    pub platforms: SlotSet,
}

impl ActiveWave {
    fn slots_mut(&mut self, lane: Lane) -> &mut SlotSet {
        match lane {
            Lane::Obstacle => &mut self.obstacles,
            Lane::Collectible => &mut self.collectibles,
            Lane::Platform => &mut self.platforms,
        }
    }

    fn entity_id(&self, lane: Lane, slot: u8) -> EntityId {
        EntityId {
            wave: self.id,
            lane,
            slot,
        }
    }
}

/// Entity lists the scheduler appends to
pub struct SpawnTargets<'a> {
    pub obstacles: &'a mut Vec<Obstacle>,
    pub collectibles: &'a mut Vec<Collectible>,
    pub platforms: &'a mut Vec<Platform>,
}

/// Wave clock and dispatch bookkeeping (part of the snapshot)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    pub wave: Option<ActiveWave>,
    pub next_wave_at: u64,
    next_wave_id: u32,
}

/// X where new entities enter, always fully outside the visible playfield
pub fn spawn_start_x(playfield_width: f32) -> f32 {
    (playfield_width + SPAWN_MARGIN).max(MIN_SPAWN_X)
}

fn slot_due(elapsed: u64, slot: u64) -> bool {
    let start = slot * SPAWN_SLOT_MS;
    elapsed >= start && elapsed < start + SPAWN_WINDOW_MS
}

impl SpawnScheduler {
    /// Draw a fresh wave when the current one's delay has elapsed, then
    /// dispatch any slots that are due at `now`
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        now: u64,
        game_speed: f32,
        level: &LevelConfig,
        playfield_width: f32,
        targets: SpawnTargets<'_>,
        rng: &mut R,
    ) {
        if self.wave.is_none() || now >= self.next_wave_at {
            let config = next_wave(game_speed, level, rng);
            log::debug!(
                "Wave {}: {:?} ({} obstacles, {} collectibles, {} steps)",
                self.next_wave_id,
                config.pattern,
                config.obstacle_count,
                config.collectible_count,
                config.platform_count
            );
            self.next_wave_at = now + config.delay_ms;
            self.wave = Some(ActiveWave {
                id: WaveId(self.next_wave_id),
                config,
                started_at: now,
                obstacles: SlotSet::default(),
                collectibles: SlotSet::default(),
                platforms: SlotSet::default(),
            });
            self.next_wave_id += 1;
        }

        if let Some(wave) = self.wave.as_mut() {
            dispatch(wave, now, level, spawn_start_x(playfield_width), targets, rng);
        }
    }
}

fn dispatch<R: Rng + ?Sized>(
    wave: &mut ActiveWave,
    now: u64,
    level: &LevelConfig,
    start_x: f32,
    targets: SpawnTargets<'_>,
    rng: &mut R,
) {
    let elapsed = now.saturating_sub(wave.started_at);
    let config = wave.config.clone();

    for slot in 0..config.obstacle_count {
        if !slot_due(elapsed, slot as u64) || !wave.slots_mut(Lane::Obstacle).insert(slot) {
            continue;
        }
        let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
        let flying = rng.random_bool(level.flying_chance.clamp(0.0, 1.0) as f64);
        let y = if flying {
            GROUND_Y + 70.0 + rng.random::<f32>() * 80.0
        } else {
            GROUND_Y
        };
        let x = start_x + slot as f32 * config.spacing;
        targets.obstacles.push(Obstacle::new(
            wave.entity_id(Lane::Obstacle, slot),
            kind,
            Vec2::new(x, y),
        ));
    }

    for slot in 0..config.collectible_count {
        let order = config.obstacle_count as u64 + slot as u64;
        if !slot_due(elapsed, order) || !wave.slots_mut(Lane::Collectible).insert(slot) {
            continue;
        }
        let mut kind = if rng.random_bool(0.5) {
            CollectibleKind::Snowflake
        } else {
            CollectibleKind::Gift
        };
        if rng.random_bool(SHIELD_SPAWN_CHANCE) {
            kind = CollectibleKind::Shield;
        } else if rng.random_bool(MAGNET_SPAWN_CHANCE) {
            kind = CollectibleKind::Magnet;
        }
        let y = GROUND_Y + 80.0 + rng.random::<f32>() * 120.0;
        let x = start_x + order as f32 * config.spacing;
        targets.collectibles.push(Collectible::new(
            wave.entity_id(Lane::Collectible, slot),
            kind,
            Vec2::new(x, y),
        ));
    }

    if config.pattern == SpawnPattern::Stairs {
        for slot in 0..config.platform_count {
            if !slot_due(elapsed, slot as u64) || !wave.slots_mut(Lane::Platform).insert(slot) {
                continue;
            }
            targets.platforms.push(Platform {
                id: wave.entity_id(Lane::Platform, slot),
                pos: Vec2::new(
                    start_x + slot as f32 * config.spacing,
                    GROUND_Y + slot as f32 * STAIR_STEP_HEIGHT,
                ),
                size: Vec2::new(STAIR_STEP_WIDTH, STAIR_STEP_THICKNESS),
            });
        }
    }
}
