//! Game state and core simulation types
//!
//! A [`GameState`] is one committed snapshot. The tick reducer builds the next
//! snapshot from the previous one; nothing else writes to it during a run.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::economy::{
    Challenge, ChallengeReward, EconomyPhase, LootEffect, WorldEvent, default_challenges,
    schedule_next_event,
};
use super::entity::{Collectible, CollectibleKind, Obstacle, Platform};
use super::spawn::SpawnScheduler;
use crate::consts::*;

/// Where the run is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Nothing started yet (or settled and waiting for the next start)
    Idle,
    /// Active gameplay
    Running,
    /// Game is paused; ticks are ignored
    Paused,
    /// Run ended on an unshielded hit
    GameOver,
}

/// Vibration cue requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticCue {
    /// Challenge reward
    Tap,
    /// Loot box drop
    Celebrate,
}

impl HapticCue {
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn pattern(self) -> &'static [u32] {
        match self {
            HapticCue::Tap => &[40],
            HapticCue::Celebrate => &[80, 40, 80],
        }
    }
}

/// Things that happened during a tick, for audio/haptics/HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Collected { kind: CollectibleKind, points: u64 },
    ShieldAbsorbed,
    ChallengeCompleted { id: String, reward: ChallengeReward },
    WorldEventStarted(WorldEvent),
    WorldEventEnded,
    PhaseChanged(EconomyPhase),
    LevelUp { index: usize },
    Haptic(HapticCue),
    GameOver { score: u64 },
}

/// The runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Bottom edge height
    pub y: f32,
    /// Vertical velocity (positive = up)
    pub velocity: f32,
    pub jumps_left: u8,
    pub dash_charges: u8,
    /// Next recharge deadline (0 = not recharging)
    pub dash_recharge_at: u64,
    pub dash_active_until: u64,
    pub sliding: bool,
    pub slide_ends_at: u64,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            y: GROUND_Y,
            velocity: 0.0,
            jumps_left: MAX_JUMPS,
            dash_charges: MAX_DASHES,
            dash_recharge_at: 0,
            dash_active_until: 0,
            sliding: false,
            slide_ends_at: 0,
        }
    }
}

impl Player {
    pub fn is_grounded(&self) -> bool {
        self.y <= GROUND_Y + GROUNDED_TOLERANCE
    }

    pub fn height(&self) -> f32 {
        if self.sliding {
            PLAYER_SIZE * SLIDE_HEIGHT_FACTOR
        } else {
            PLAYER_SIZE
        }
    }

    /// Current hitbox
    pub fn bounds(&self) -> Aabb {
        Aabb::from_bottom_left(
            Vec2::new(PLAYER_X, self.y),
            Vec2::new(PLAYER_SIZE, self.height()),
        )
    }

    pub fn dash_active(&self, now: u64) -> bool {
        now < self.dash_active_until
    }

    /// Stand on a surface and refill jumps. Touching down from the air also
    /// ends a slide; staying on the surface does not.
    pub fn land_on(&mut self, surface: f32, from_air: bool) {
        self.y = surface;
        self.velocity = 0.0;
        self.jumps_left = MAX_JUMPS;
        if from_air {
            self.end_slide();
        }
    }

    pub fn end_slide(&mut self) {
        self.sliding = false;
        self.slide_ends_at = 0;
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: RunPhase,
    pub score: u64,
    pub level_index: usize,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub platforms: Vec<Platform>,
    /// Speed at run start (includes the persisted start-speed perk)
    pub base_speed: f32,
    /// Speed bought in the shop during this run
    pub speed_bonus: f32,
    /// World scroll multiplier
    pub game_speed: f32,
    pub combo: u32,
    pub last_collect_at: u64,
    pub shields: u8,
    pub invulnerable_until: u64,
    pub magnet_until: u64,
    pub world_event: WorldEvent,
    pub event_ends_at: u64,
    pub next_event_at: u64,
    pub economy_phase: EconomyPhase,
    pub phase_ends_at: u64,
    /// Collisions are ignored until this time
    pub start_grace_until: u64,
    pub challenges: Vec<Challenge>,
    pub scheduler: SpawnScheduler,
    /// Time of the previous tick (None right after start or resume)
    pub last_tick_at: Option<u64>,
    pub playfield_width: f32,
    /// Events produced by the latest transition
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Pre-run state shown before the first start
    pub fn idle(base_speed: f32, playfield_width: f32) -> Self {
        Self {
            phase: RunPhase::Idle,
            score: 0,
            level_index: 0,
            player: Player::default(),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            platforms: Vec::new(),
            base_speed,
            speed_bonus: 0.0,
            game_speed: base_speed,
            combo: 0,
            last_collect_at: 0,
            shields: 0,
            invulnerable_until: 0,
            magnet_until: 0,
            world_event: WorldEvent::None,
            event_ends_at: 0,
            next_event_at: 0,
            economy_phase: EconomyPhase::Calm,
            phase_ends_at: 0,
            start_grace_until: 0,
            challenges: Vec::new(),
            scheduler: SpawnScheduler::default(),
            last_tick_at: None,
            playfield_width,
            events: Vec::new(),
        }
    }

    /// Fresh running state at `now`, with an optional staged loot effect applied
    pub fn new_run<R: Rng + ?Sized>(
        now: u64,
        base_speed: f32,
        playfield_width: f32,
        loot: Option<LootEffect>,
        rng: &mut R,
    ) -> Self {
        let mut state = Self::idle(base_speed, playfield_width);
        state.phase = RunPhase::Running;
        state.next_event_at = schedule_next_event(now, rng);
        state.phase_ends_at = now + PHASE_DURATION_MS;
        state.start_grace_until = now + START_GRACE_MS;
        state.challenges = default_challenges();
        if let Some(effect) = loot {
            effect.apply_at_start(&mut state, now);
        }
        state
    }

    /// A run is in progress (running or paused)
    pub fn is_playing(&self) -> bool {
        matches!(self.phase, RunPhase::Running | RunPhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == RunPhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    pub fn magnet_active(&self, now: u64) -> bool {
        now < self.magnet_until
    }

    /// Dash, post-hit grace, or start-of-run grace
    pub fn is_invulnerable(&self, now: u64) -> bool {
        now < self.invulnerable_until
            || self.player.dash_active(now)
            || now < self.start_grace_until
    }

    /// Grant one shield from a pickup or challenge (never lowers a shop-raised count)
    pub fn grant_pickup_shield(&mut self) {
        if self.shields < MAX_PICKUP_SHIELDS {
            self.shields += 1;
        }
    }

    /// Start or extend the magnet window
    pub fn extend_magnet(&mut self, now: u64) {
        self.magnet_until = self.magnet_until.max(now + MAGNET_DURATION_MS);
    }
}
