//! Progression and economy rules
//!
//! Scoring with combos, timed world events, the calm/heat/reward phase cycle,
//! per-run challenges, loot effects, and the upgrade shop. Everything here is
//! pure data and rules; the tick reducer and the run state machine decide when
//! they apply.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::CollectibleKind;
use super::level::{LevelConfig, level_for_score, levels};
use super::state::GameState;
use crate::consts::*;
use crate::perks::{Perks, Skin};

// === World events ===

/// Global timed modifier layered over level and phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldEvent {
    #[default]
    None,
    /// Bigger scores, slightly denser spawns
    Frenzy,
    /// Faster scroll, slightly denser spawns
    Blizzard,
}

impl WorldEvent {
    pub fn score_multiplier(self) -> f64 {
        match self {
            WorldEvent::Frenzy => 1.5,
            _ => 1.0,
        }
    }

    pub fn spawn_boost(self) -> f32 {
        match self {
            WorldEvent::None => 1.0,
            WorldEvent::Frenzy => 1.15,
            WorldEvent::Blizzard => 1.08,
        }
    }

    pub fn scroll_boost(self) -> f32 {
        match self {
            WorldEvent::Blizzard => 1.15,
            _ => 1.0,
        }
    }
}

/// Coin flip between the two events
pub fn draw_world_event<R: Rng + ?Sized>(rng: &mut R) -> WorldEvent {
    if rng.random_bool(0.5) {
        WorldEvent::Frenzy
    } else {
        WorldEvent::Blizzard
    }
}

/// Deadline for the next world event, 12-18s after `from`
pub fn schedule_next_event<R: Rng + ?Sized>(from: u64, rng: &mut R) -> u64 {
    from + rng.random_range(EVENT_MIN_DELAY_MS..=EVENT_MAX_DELAY_MS)
}

// === Phases ===

/// Always-on cycle modulating spawn density
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EconomyPhase {
    #[default]
    Calm,
    Heat,
    Reward,
}

impl EconomyPhase {
    pub fn next(self) -> Self {
        match self {
            EconomyPhase::Calm => EconomyPhase::Heat,
            EconomyPhase::Heat => EconomyPhase::Reward,
            EconomyPhase::Reward => EconomyPhase::Calm,
        }
    }

    pub fn spawn_boost(self) -> f32 {
        match self {
            EconomyPhase::Calm => 1.0,
            EconomyPhase::Heat => 1.15,
            EconomyPhase::Reward => 0.9,
        }
    }
}

/// Level tunables with event and phase density applied (multiplicatively)
pub fn effective_level(level: &LevelConfig, event: WorldEvent, phase: EconomyPhase) -> LevelConfig {
    LevelConfig {
        spawn_multiplier: level.spawn_multiplier * event.spawn_boost() * phase.spawn_boost(),
        ..level.clone()
    }
}

// === Combo and scoring ===

/// Combo still alive at `now` (drops to zero after the idle window)
pub fn live_combo(combo: u32, last_collect_at: u64, now: u64) -> u32 {
    if now.saturating_sub(last_collect_at) > COMBO_WINDOW_MS {
        0
    } else {
        combo
    }
}

/// Points for a snowflake or gift; `combo` is the chain length before this pickup
pub fn pickup_points(base_points: u64, game_speed: f32, combo: u32, event: WorldEvent) -> u64 {
    let speed_bonus = (game_speed * 2.0).floor().max(0.0) as u64;
    let combo_multiplier = 1.0 + combo.min(MAX_COMBO) as f64 * 0.1;
    ((base_points + speed_bonus) as f64 * combo_multiplier * event.score_multiplier()).floor() as u64
}

/// Flat bonus for power-up pickups
pub const SHIELD_PICKUP_POINTS: u64 = 15;
pub const MAGNET_PICKUP_POINTS: u64 = 20;

// === Challenges ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    CollectSnow,
    CollectGift,
    Survive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeReward {
    Shield,
    Magnet,
    Points,
    Dash,
}

/// Points granted by a points reward
pub const CHALLENGE_POINTS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub kind: ChallengeKind,
    pub target: f32,
    pub progress: f32,
    pub reward: ChallengeReward,
    pub completed: bool,
    pub description: String,
}

impl Challenge {
    fn new(id: &str, kind: ChallengeKind, target: f32, reward: ChallengeReward, description: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            target,
            progress: 0.0,
            reward,
            completed: false,
            description: description.to_string(),
        }
    }

    /// Whether picking up `kind` advances this challenge
    pub fn counts_pickup(&self, kind: CollectibleKind) -> bool {
        matches!(
            (self.kind, kind),
            (ChallengeKind::CollectSnow, CollectibleKind::Snowflake)
                | (ChallengeKind::CollectGift, CollectibleKind::Gift)
        )
    }

    /// Add progress; true only on the transition to completed
    pub fn advance(&mut self, amount: f32) -> bool {
        if self.completed {
            return false;
        }
        self.progress = (self.progress + amount).min(self.target);
        self.completed = self.progress >= self.target;
        self.completed
    }
}

/// The three templates every run starts with
pub fn default_challenges() -> Vec<Challenge> {
    vec![
        Challenge::new("c1", ChallengeKind::CollectSnow, 8.0, ChallengeReward::Magnet, "Collect 8 snowflakes"),
        Challenge::new("c2", ChallengeKind::CollectGift, 3.0, ChallengeReward::Shield, "Grab 3 gifts"),
        Challenge::new("c3", ChallengeKind::Survive, 25.0, ChallengeReward::Points, "Survive 25s"),
    ]
}

/// Apply a challenge reward to the running state
pub fn grant_challenge_reward(state: &mut GameState, reward: ChallengeReward, now: u64) {
    match reward {
        ChallengeReward::Shield => state.grant_pickup_shield(),
        ChallengeReward::Magnet => state.extend_magnet(now),
        ChallengeReward::Dash => {
            if state.player.dash_charges < MAX_DASHES {
                state.player.dash_charges += 1;
            }
        }
        ChallengeReward::Points => state.score += CHALLENGE_POINTS,
    }
}

// === Loot boxes ===

/// Reward staged at run end and applied when the next run starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootEffect {
    Shield(u8),
    Magnet,
    Dash,
    BonusScore(u64),
}

impl LootEffect {
    pub const POOL: [LootEffect; 4] = [
        LootEffect::Shield(1),
        LootEffect::Magnet,
        LootEffect::Dash,
        LootEffect::BonusScore(200),
    ];

    /// Uniform draw from the pool
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::POOL[rng.random_range(0..Self::POOL.len())]
    }

    pub fn label(&self) -> String {
        match self {
            LootEffect::Shield(_) => "Shield boost".to_string(),
            LootEffect::Magnet => "Magnet boost".to_string(),
            LootEffect::Dash => "Dash charge".to_string(),
            LootEffect::BonusScore(points) => format!("+{points} points next run"),
        }
    }

    /// Apply to a freshly reset run
    pub fn apply_at_start(&self, state: &mut GameState, now: u64) {
        match *self {
            LootEffect::Shield(count) => state.shields = count.min(MAX_SHIELDS),
            LootEffect::Magnet => state.magnet_until = now + MAGNET_DURATION_MS,
            LootEffect::Dash => {
                state.player.dash_charges = (state.player.dash_charges + 1).min(MAX_DASHES);
            }
            LootEffect::BonusScore(points) => {
                state.score = points;
                state.level_index = level_for_score(points);
            }
        }
    }
}

/// Every third run, or any big run, ends with a loot box
pub fn should_drop_loot(runs_since_loot: u32, score: u64) -> bool {
    runs_since_loot >= LOOT_EVERY_RUNS || score >= LOOT_SCORE_THRESHOLD
}

// === Upgrade shop ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    Shield,
    Dash,
    Magnet,
    Speed,
    StartSpeed,
    SkinFrost,
    SkinBlaze,
}

impl UpgradeKind {
    pub fn cost(self) -> u64 {
        match self {
            UpgradeKind::Shield => 150,
            UpgradeKind::Dash => 120,
            UpgradeKind::Magnet => 100,
            UpgradeKind::Speed => 80,
            UpgradeKind::StartSpeed => 220,
            UpgradeKind::SkinFrost | UpgradeKind::SkinBlaze => 180,
        }
    }

    fn skin(self) -> Option<Skin> {
        match self {
            UpgradeKind::SkinFrost => Some(Skin::Frost),
            UpgradeKind::SkinBlaze => Some(Skin::Blaze),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("no run in progress")]
    NotPlaying,
    #[error("upgrade costs {cost} but only {score} points are available")]
    InsufficientScore { cost: u64, score: u64 },
    #[error("{0:?} is already at its cap")]
    Saturated(UpgradeKind),
}

/// Spend run score on an upgrade. Rejected purchases leave state and perks untouched.
///
/// Returns the points actually spent (zero when re-selecting an owned skin).
pub fn purchase(
    state: &mut GameState,
    kind: UpgradeKind,
    perks: &mut Perks,
    now: u64,
) -> Result<u64, PurchaseError> {
    if !state.is_playing() {
        return Err(PurchaseError::NotPlaying);
    }
    let cost = kind.cost();

    if let Some(skin) = kind.skin() {
        if perks.is_unlocked(skin) {
            perks.player_skin = skin;
            return Ok(0);
        }
        ensure_affordable(state, cost)?;
        state.score -= cost;
        perks.unlock(skin);
        perks.player_skin = skin;
        return Ok(cost);
    }

    let speed_cap = levels()[state.level_index].speed_cap;
    let saturated = match kind {
        UpgradeKind::Shield => state.shields >= MAX_SHIELDS,
        UpgradeKind::Dash => state.player.dash_charges >= SHOP_MAX_DASHES,
        UpgradeKind::Magnet => false,
        UpgradeKind::Speed => state.game_speed >= speed_cap,
        UpgradeKind::StartSpeed => perks.start_speed_maxed(),
        UpgradeKind::SkinFrost | UpgradeKind::SkinBlaze => false,
    };
    if saturated {
        return Err(PurchaseError::Saturated(kind));
    }
    ensure_affordable(state, cost)?;
    state.score -= cost;

    match kind {
        UpgradeKind::Shield => state.shields += 1,
        UpgradeKind::Dash => {
            state.player.dash_charges += 1;
            if state.player.dash_charges >= MAX_DASHES {
                state.player.dash_recharge_at = 0;
            }
        }
        UpgradeKind::Magnet => state.extend_magnet(now),
        UpgradeKind::Speed => {
            state.speed_bonus += SPEED_UPGRADE_STEP;
            state.game_speed = (state.game_speed + SPEED_UPGRADE_STEP).min(speed_cap);
        }
        UpgradeKind::StartSpeed => {
            perks.raise_start_speed();
            state.speed_bonus += START_SPEED_STEP;
            state.game_speed = (state.game_speed + START_SPEED_STEP).min(speed_cap);
        }
        UpgradeKind::SkinFrost | UpgradeKind::SkinBlaze => {}
    }
    Ok(cost)
}

fn ensure_affordable(state: &GameState, cost: u64) -> Result<(), PurchaseError> {
    if state.score < cost {
        return Err(PurchaseError::InsufficientScore {
            cost,
            score: state.score,
        });
    }
    Ok(())
}
