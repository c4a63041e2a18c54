//! Snowy Run - an endless-runner arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (levels, waves, spawning, physics, economy)
//! - `game`: Run state machine and player control surface
//! - `session`: Per-frame driver wiring the engine to its collaborators
//! - `perks`: Cross-run perks persisted to key-value storage
//! - `scores`: Score submission with a local fallback ledger
//! - `remote`: HTTP transports for the score service
//! - `storage`: Key-value storage backends (memory, file, LocalStorage)
//! - `platform`: Browser/native clock and haptics

pub mod autopilot;
pub mod game;
pub mod perks;
pub mod platform;
pub mod remote;
pub mod scores;
pub mod session;
pub mod settings;
pub mod sim;
pub mod storage;

pub use game::{SnowyRun, UpgradeKind};
pub use perks::{PerkStore, Perks, Skin};
pub use scores::{LocalScoreLedger, ScoreBackend, ScoreService, ScoreUpdate, UserStats};
pub use session::Session;
pub use settings::Settings;
pub use storage::{KeyValueStore, MemoryStore};

/// Game configuration constants
pub mod consts {
    /// Nominal frame length at 60 Hz (ms)
    pub const FRAME_MS: u64 = 16;
    /// Longest wall-time step credited to a single tick (ms)
    pub const MAX_FRAME_MS: u64 = 100;

    /// Number of entries in the level table
    pub const LEVEL_COUNT: usize = 100;

    /// Player physics (world units per tick)
    pub const GRAVITY: f32 = 1.0;
    pub const JUMP_STRENGTH: f32 = 18.0;
    /// Ground surface height; player `y` is the bottom edge
    pub const GROUND_Y: f32 = 56.0;
    /// Hard ceiling for the player's bottom edge
    pub const MAX_JUMP_HEIGHT: f32 = 150.0;
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Fixed horizontal position of the player's left edge
    pub const PLAYER_X: f32 = 100.0;
    /// Hitbox height factor while sliding
    pub const SLIDE_HEIGHT_FACTOR: f32 = 0.6;
    /// Slack allowed when deciding the player stands on the ground
    pub const GROUNDED_TOLERANCE: f32 = 2.0;

    pub const MAX_JUMPS: u8 = 2;
    pub const MAX_DASHES: u8 = 2;
    /// Dash cap reachable through the upgrade shop
    pub const SHOP_MAX_DASHES: u8 = MAX_DASHES + 1;
    pub const MAX_PICKUP_SHIELDS: u8 = 2;
    pub const MAX_SHIELDS: u8 = 3;
    pub const MAX_COMBO: u32 = 10;

    /// Durations (ms)
    pub const SLIDE_DURATION_MS: u64 = 600;
    pub const INVULNERABLE_MS: u64 = 1400;
    pub const MAGNET_DURATION_MS: u64 = 4500;
    pub const DASH_COOLDOWN_MS: u64 = 5000;
    pub const DASH_DURATION_MS: u64 = 700;
    pub const START_GRACE_MS: u64 = 1200;
    pub const COMBO_WINDOW_MS: u64 = 2000;

    /// World scroll
    pub const BASE_GAME_SPEED: f32 = 1.1;
    pub const OBSTACLE_SPEED: f32 = 8.0;
    pub const COLLECTIBLE_SPEED: f32 = 8.0;
    pub const PLATFORM_SPEED_FACTOR: f32 = 0.95;
    /// World scroll multiplier while a dash is active
    pub const DASH_SCROLL_BOOST: f32 = 1.6;
    /// Upward velocity after a shield absorbs a hit
    pub const SHIELD_BOUNCE_FACTOR: f32 = 0.6;
    /// Score needed for +1.0 game speed
    pub const SCORE_PER_SPEED: f32 = 700.0;

    /// Spawning
    pub const SPAWN_MARGIN: f32 = 40.0;
    pub const MIN_SPAWN_X: f32 = 760.0;
    pub const SPAWN_SLOT_MS: u64 = 200;
    pub const SPAWN_WINDOW_MS: u64 = 100;
    pub const SHIELD_SPAWN_CHANCE: f64 = 0.1;
    pub const MAGNET_SPAWN_CHANCE: f64 = 0.08;
    pub const STAIR_STEP_HEIGHT: f32 = 22.0;
    pub const STAIR_STEP_WIDTH: f32 = 90.0;
    pub const STAIR_STEP_THICKNESS: f32 = 18.0;
    pub const COLLECTIBLE_SIZE: f32 = 30.0;
    /// Entities are dropped once their x passes these
    pub const OBSTACLE_DESPAWN_X: f32 = -80.0;
    pub const COLLECTIBLE_DESPAWN_X: f32 = -70.0;
    pub const PLATFORM_DESPAWN_X: f32 = -140.0;

    /// Live entity caps per snapshot
    pub const MAX_OBSTACLES: usize = 60;
    pub const MAX_COLLECTIBLES: usize = 60;
    pub const MAX_PLATFORMS: usize = 20;

    /// Collision padding (positive shrinks, negative grows the overlap test)
    pub const OBSTACLE_PADDING: f32 = 5.0;
    pub const COLLECT_PADDING: f32 = -10.0;
    pub const MAGNET_COLLECT_PADDING: f32 = -30.0;
    pub const PLATFORM_SUPPORT_INSET: f32 = 8.0;
    /// How far below a platform top the previous position may be and still land
    pub const PLATFORM_LANDING_SLACK: f32 = 5.0;

    /// Magnet pull
    pub const MAGNET_MIN_RANGE: f32 = 220.0;
    pub const MAGNET_RANGE_FACTOR: f32 = 0.45;
    pub const MAGNET_PULL: f32 = 0.12;
    pub const MAGNET_DRIFT: f32 = 1.2;

    /// World events and phases (ms)
    pub const EVENT_MIN_DELAY_MS: u64 = 12_000;
    pub const EVENT_MAX_DELAY_MS: u64 = 18_000;
    pub const EVENT_DURATION_MS: u64 = 6_000;
    pub const PHASE_DURATION_MS: u64 = 18_000;

    /// Loot boxes
    pub const LOOT_EVERY_RUNS: u32 = 3;
    pub const LOOT_SCORE_THRESHOLD: u64 = 600;

    /// Persisted start-speed perk
    pub const START_SPEED_STEP: f32 = 0.2;
    pub const MAX_START_SPEED_BONUS: f32 = 1.2;
    pub const SPEED_UPGRADE_STEP: f32 = 0.15;
}
