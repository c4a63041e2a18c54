//! Run state machine and player control surface
//!
//! [`SnowyRun`] owns the committed [`GameState`] snapshot and is its only
//! writer. Frames go through the pure [`tick`] reducer; controls, pause, the
//! shop, and loot claims act on the snapshot directly. Entering game-over
//! settles the run exactly once.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::BASE_GAME_SPEED;
use crate::perks::{PerkStore, Perks};
use crate::settings::Settings;
use crate::sim::economy::{LootEffect, PurchaseError, purchase, should_drop_loot};
use crate::sim::level::{LevelConfig, levels, next_level_score};
use crate::sim::tick::{Controls, TickInput, apply_controls, tick};
use crate::sim::{GameEvent, GameState, HapticCue, RunPhase};
use crate::storage::KeyValueStore;

pub use crate::sim::economy::UpgradeKind;

/// Outcome of a finished run, handed to the score service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub level_index: usize,
    pub ended_at: u64,
    /// Loot box dropped by this run, if any
    pub loot: Option<LootEffect>,
}

pub struct SnowyRun<S> {
    state: GameState,
    rng: Pcg32,
    perks: Perks,
    perk_store: PerkStore<S>,
    settings: Settings,
    /// Loot shown at game-over, waiting for the player to claim it
    lootbox_reward: Option<LootEffect>,
    /// Claimed loot applied when the next run starts
    pending_loot: Option<LootEffect>,
    runs_since_loot: u32,
    daily_run_count: u32,
    settlements: Vec<RunSummary>,
}

impl<S: KeyValueStore> SnowyRun<S> {
    pub fn new(settings: Settings, perk_store: PerkStore<S>, seed: u64) -> Self {
        let perks = perk_store.load();
        let state = GameState::idle(
            BASE_GAME_SPEED + perks.start_speed_bonus,
            settings.playfield_width,
        );
        Self {
            state,
            rng: Pcg32::seed_from_u64(seed),
            perks,
            perk_store,
            settings,
            lootbox_reward: None,
            pending_loot: None,
            runs_since_loot: 0,
            daily_run_count: 0,
            settlements: Vec::new(),
        }
    }

    /// Latest committed snapshot
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn perks(&self) -> &Perks {
        &self.perks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn lootbox_reward(&self) -> Option<LootEffect> {
        self.lootbox_reward
    }

    pub fn pending_loot(&self) -> Option<LootEffect> {
        self.pending_loot
    }

    pub fn runs_since_loot(&self) -> u32 {
        self.runs_since_loot
    }

    pub fn daily_run_count(&self) -> u32 {
        self.daily_run_count
    }

    /// Update the eligibility counter from a score receipt or stats fetch
    pub fn set_daily_run_count(&mut self, count: u32) {
        self.daily_run_count = count;
    }

    pub fn can_play(&self) -> bool {
        self.settings.allows_run(self.daily_run_count)
    }

    /// Events produced by the latest transition
    pub fn events(&self) -> &[GameEvent] {
        &self.state.events
    }

    /// Start (or restart) a run. No-op when the daily limit is reached.
    pub fn start_game(&mut self, now: u64) -> bool {
        if !self.can_play() {
            log::info!(
                "Daily run limit reached ({} runs today)",
                self.daily_run_count
            );
            return false;
        }
        if let Some(unclaimed) = self.lootbox_reward.take() {
            log::info!("Unclaimed loot discarded: {}", unclaimed.label());
        }
        let loot = self.pending_loot.take();
        let base_speed = BASE_GAME_SPEED + self.perks.start_speed_bonus;
        self.state = GameState::new_run(
            now,
            base_speed,
            self.settings.playfield_width,
            loot,
            &mut self.rng,
        );
        log::info!(
            "Run started (base speed {:.2}{})",
            base_speed,
            loot.map(|l| format!(", {}", l.label())).unwrap_or_default()
        );
        true
    }

    pub fn jump(&mut self, now: u64) -> bool {
        self.control(Controls { jump: true, ..Default::default() }, now).jump
    }

    pub fn slide(&mut self, now: u64) -> bool {
        self.control(Controls { slide: true, ..Default::default() }, now).slide
    }

    pub fn dash(&mut self, now: u64) -> bool {
        self.control(Controls { dash: true, ..Default::default() }, now).dash
    }

    fn control(&mut self, controls: Controls, now: u64) -> Controls {
        apply_controls(&mut self.state, controls, now)
    }

    /// Toggle pause. Resuming restarts frame timing so the pause isn't credited.
    pub fn pause_game(&mut self) {
        match self.state.phase {
            RunPhase::Running => {
                self.state.phase = RunPhase::Paused;
                log::info!("Paused");
            }
            RunPhase::Paused => {
                self.state.phase = RunPhase::Running;
                self.state.last_tick_at = None;
                log::info!("Resumed");
            }
            RunPhase::Idle | RunPhase::GameOver => {}
        }
    }

    /// Advance one frame at `now`
    pub fn advance(&mut self, now: u64) -> &[GameEvent] {
        self.frame(&TickInput::at(now))
    }

    /// Advance one frame with explicit input
    pub fn frame(&mut self, input: &TickInput) -> &[GameEvent] {
        let was_over = self.state.is_game_over();
        self.state = tick(&self.state, input, &mut self.rng);
        if !was_over && self.state.is_game_over() {
            self.settle(input.now);
        }
        &self.state.events
    }

    /// Runs once per game-over transition
    fn settle(&mut self, now: u64) {
        self.runs_since_loot += 1;
        let score = self.state.score;
        let loot = if should_drop_loot(self.runs_since_loot, score) {
            let reward = LootEffect::draw(&mut self.rng);
            log::info!("Loot box: {}", reward.label());
            self.runs_since_loot = 0;
            self.state.events.push(GameEvent::Haptic(HapticCue::Celebrate));
            Some(reward)
        } else {
            None
        };
        self.lootbox_reward = loot;
        self.settlements.push(RunSummary {
            score,
            level_index: self.state.level_index,
            ended_at: now,
            loot,
        });
    }

    /// Stage the shown loot for the next run
    pub fn claim_lootbox(&mut self) -> Option<LootEffect> {
        let reward = self.lootbox_reward.take()?;
        log::info!("Loot claimed: {}", reward.label());
        self.pending_loot = Some(reward);
        Some(reward)
    }

    /// Spend run score in the shop. Persists perks when they change.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind, now: u64) -> Result<u64, PurchaseError> {
        let before = self.perks.clone();
        let spent = purchase(&mut self.state, kind, &mut self.perks, now)?;
        log::info!("Bought {kind:?} for {spent}");
        if self.perks != before {
            self.perk_store.save(&self.perks);
        }
        Ok(spent)
    }

    /// Finished runs not yet handed to the score service
    pub fn take_settlements(&mut self) -> Vec<RunSummary> {
        std::mem::take(&mut self.settlements)
    }

    pub fn current_level(&self) -> &'static LevelConfig {
        &levels()[self.state.level_index]
    }

    /// Score needed for the next level (None at the top)
    pub fn next_level_score(&self) -> Option<u64> {
        next_level_score(self.state.level_index)
    }
}
