//! Per-frame driver
//!
//! A [`Session`] is what the host's frame callback talks to. It steps the run
//! once per display frame, forwards haptic cues, and queues finished runs with
//! the score service after the frame's tick has completed. Replies are applied
//! at the start of a later frame, so score traffic never blocks or fails one.

use std::collections::HashMap;

use rand::Rng;

use crate::game::SnowyRun;
use crate::perks::PerkStore;
use crate::platform::{self, VibrateFn};
use crate::scores::{
    LeaderboardEntry, Period, ScoreBackend, ScoreService, ScoreUpdate, Ticket, UserStats,
};
use crate::settings::Settings;
use crate::sim::{GameEvent, TickInput};
use crate::storage::KeyValueStore;

pub struct Session<B, S> {
    game: SnowyRun<S>,
    scores: ScoreService<B, S>,
    stats: UserStats,
    boards: HashMap<Period, Vec<LeaderboardEntry>>,
    /// Newest request whose daily count is authoritative
    count_ticket: Option<Ticket>,
    vibrate: VibrateFn,
    active: bool,
}

impl<B: ScoreBackend, S: KeyValueStore + Clone> Session<B, S> {
    /// Wire a run to its collaborators; `store` backs perks and the local ledger
    pub fn new(settings: Settings, backend: B, store: S, now: u64) -> Self {
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        log::info!("Session seed {seed}");
        let mut session = Self {
            scores: ScoreService::new(backend, store.clone()),
            game: SnowyRun::new(settings, PerkStore::new(store), seed),
            stats: UserStats::default(),
            boards: HashMap::new(),
            count_ticket: None,
            vibrate: platform::vibrate,
            active: true,
        };
        session.refresh_stats();
        // Backends with an answer at hand settle it before the first frame
        session.pump(now);
        session
    }

    /// Replace the vibration hook
    pub fn with_haptics(mut self, vibrate: VibrateFn) -> Self {
        self.vibrate = vibrate;
        self
    }

    pub fn game(&self) -> &SnowyRun<S> {
        &self.game
    }

    /// Control surface (start, jump, slide, dash, pause, shop, loot)
    pub fn game_mut(&mut self) -> &mut SnowyRun<S> {
        &mut self.game
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Step one display frame. Returns the frame's events.
    pub fn frame(&mut self, input: &TickInput) -> Vec<GameEvent> {
        if !self.active {
            return Vec::new();
        }
        self.pump(input.now);
        let events = self.game.frame(input).to_vec();
        if self.game.settings().haptics {
            for event in &events {
                if let GameEvent::Haptic(cue) = event {
                    (self.vibrate)(cue.pattern());
                }
            }
        }
        self.submit_settlements();
        events
    }

    fn wallet(&self) -> Option<String> {
        self.game.settings().wallet_address.clone()
    }

    fn submit_settlements(&mut self) {
        for summary in self.game.take_settlements() {
            let wallet = self.wallet();
            let ticket = self.scores.submit(summary.score, wallet.as_deref(), summary.ended_at);
            // Count the run now; the receipt corrects it when it lands
            let count = self.game.daily_run_count() + 1;
            self.set_daily_count(count);
            self.count_ticket = Some(ticket);
            log::info!("Queued {} points as {ticket:?}", summary.score);
        }
    }

    fn set_daily_count(&mut self, count: u32) {
        self.game.set_daily_run_count(count);
        self.stats.daily_run_count = count;
    }

    /// Whether a count from `ticket` is at least as new as the one shown
    fn count_is_current(&self, ticket: Ticket) -> bool {
        self.count_ticket.is_none_or(|newest| ticket >= newest)
    }

    /// Apply every score-service reply that has arrived
    pub fn pump(&mut self, now: u64) {
        for update in self.scores.poll(now) {
            match update {
                ScoreUpdate::Submitted {
                    ticket,
                    receipt,
                    source,
                } => {
                    log::info!(
                        "{ticket:?} settled ({source:?}): {} runs today",
                        receipt.daily_run_count
                    );
                    if self.count_is_current(ticket) {
                        self.count_ticket = Some(ticket);
                        self.set_daily_count(receipt.daily_run_count);
                    } else {
                        log::debug!("Ignoring stale run count from {ticket:?}");
                    }
                }
                ScoreUpdate::Stats {
                    ticket,
                    mut stats,
                    source,
                } => {
                    log::debug!("Stats from {source:?}");
                    if self.count_is_current(ticket) {
                        self.count_ticket = Some(ticket);
                        self.game.set_daily_run_count(stats.daily_run_count);
                    } else {
                        stats.daily_run_count = self.game.daily_run_count();
                    }
                    self.stats = stats;
                }
                ScoreUpdate::Leaderboard {
                    period,
                    rows,
                    source,
                } => {
                    log::debug!("{} {period:?} leaderboard rows from {source:?}", rows.len());
                    self.boards.insert(period, rows);
                }
            }
        }
    }

    /// Last known stats for the player
    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    /// Ask for fresh stats; they land on a later [`pump`](Self::pump)
    pub fn refresh_stats(&mut self) -> Ticket {
        let wallet = self.wallet();
        self.scores.request_stats(wallet.as_deref())
    }

    /// Last leaderboard received for `period` (empty until one arrives)
    pub fn leaderboard(&self, period: Period) -> &[LeaderboardEntry] {
        self.boards.get(&period).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn request_leaderboard(&mut self, period: Period, limit: usize) -> Ticket {
        self.scores.request_leaderboard(period, limit)
    }

    /// Score requests still waiting for a reply
    pub fn pending_requests(&self) -> usize {
        self.scores.in_flight()
    }

    /// Stop driving frames. Finished runs still waiting are queued first.
    pub fn shutdown(&mut self, now: u64) {
        if !self.active {
            return;
        }
        self.submit_settlements();
        self.pump(now);
        let pending = self.scores.in_flight();
        if pending > 0 {
            log::warn!("Closing with {pending} score requests in flight");
        }
        self.active = false;
        log::info!("Session closed");
    }
}
