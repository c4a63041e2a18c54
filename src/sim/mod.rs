//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes from the caller, never from a clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No storage, network, or platform dependencies

pub mod collision;
pub mod economy;
pub mod entity;
pub mod level;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod wave;

pub use collision::Aabb;
pub use economy::{
    Challenge, ChallengeKind, ChallengeReward, EconomyPhase, LootEffect, PurchaseError,
    UpgradeKind, WorldEvent, purchase, should_drop_loot,
};
pub use entity::{Collectible, CollectibleKind, EntityId, Obstacle, ObstacleKind, Platform};
pub use level::{LevelConfig, Overlay, level_for_score, levels, next_level_score};
pub use spawn::SpawnScheduler;
pub use state::{GameEvent, GameState, HapticCue, Player, RunPhase};
pub use tick::{Controls, TickInput, apply_controls, run_speed, tick};
pub use wave::{SpawnPattern, WaveConfig};
