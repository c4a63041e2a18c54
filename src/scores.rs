//! Score submission and player stats
//!
//! A [`ScoreBackend`] is the remote leaderboard service. Calls to it never
//! block: requests are queued under a [`Ticket`] and their replies are picked
//! up on a later poll. It is best-effort too. When a call fails,
//! [`ScoreService`] answers from a [`LocalScoreLedger`] kept in key-value
//! storage so daily run counts and leaderboards keep working offline.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{KeyValueStore, load_json, save_json};

/// Maximum number of local score entries to keep
pub const MAX_LOCAL_SCORES: usize = 200;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;
const WEEK_MS: u64 = 7 * DAY_MS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("score service unreachable: {0}")]
    Unreachable(String),
    #[error("score service rejected the request: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Response to a score submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub daily_run_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub daily_run_count: u32,
    pub daily_best_score: u64,
    pub weekly_best_score: u64,
    pub all_time_best_score: u64,
    pub daily_rank: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    AllTime,
}

impl Period {
    /// Query-string name used by the score service
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::AllTime => "alltime",
        }
    }

    /// Whether a score made at `timestamp` counts for this period at `now`
    pub fn contains(self, timestamp: u64, now: u64) -> bool {
        match self {
            Period::Daily => timestamp / DAY_MS == now / DAY_MS,
            Period::Weekly => now.saturating_sub(timestamp) <= WEEK_MS,
            Period::AllTime => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-indexed
    pub rank: u32,
    pub player_id: String,
    pub score: u64,
}

/// Identifies one call to the score service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// A call to the score service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreRequest {
    Submit { score: u64, wallet: Option<String> },
    Stats { wallet: Option<String> },
    Leaderboard { period: Period, limit: usize },
}

/// The service's answer to a [`ScoreRequest`]
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreReply {
    Submitted(Result<SubmitReceipt, BackendError>),
    Stats(Result<UserStats, BackendError>),
    Leaderboard(Result<Vec<LeaderboardEntry>, BackendError>),
}

impl ScoreReply {
    /// The reply for a request whose call failed outright
    pub fn failed(request: &ScoreRequest, error: BackendError) -> Self {
        match request {
            ScoreRequest::Submit { .. } => ScoreReply::Submitted(Err(error)),
            ScoreRequest::Stats { .. } => ScoreReply::Stats(Err(error)),
            ScoreRequest::Leaderboard { .. } => ScoreReply::Leaderboard(Err(error)),
        }
    }

    /// The error carried by a reply that cannot answer its request
    fn into_error(self) -> BackendError {
        match self {
            ScoreReply::Submitted(Err(e)) | ScoreReply::Stats(Err(e)) | ScoreReply::Leaderboard(Err(e)) => e,
            _ => BackendError::Malformed("reply does not match its request".to_string()),
        }
    }
}

/// Remote score service
///
/// `send` must return immediately. Replies surface through `poll`, in any
/// order and possibly several frames later.
pub trait ScoreBackend {
    fn send(&mut self, ticket: Ticket, request: ScoreRequest);

    /// Replies that arrived since the previous poll
    fn poll(&mut self) -> Vec<(Ticket, ScoreReply)>;
}

/// Backend for builds without a network service; every call fails
#[derive(Debug, Default)]
pub struct OfflineBackend {
    failed: Vec<(Ticket, ScoreReply)>,
}

impl ScoreBackend for OfflineBackend {
    fn send(&mut self, ticket: Ticket, request: ScoreRequest) {
        let reply = ScoreReply::failed(&request, BackendError::Unreachable("offline".to_string()));
        self.failed.push((ticket, reply));
    }

    fn poll(&mut self) -> Vec<(Ticket, ScoreReply)> {
        std::mem::take(&mut self.failed)
    }
}

/// A single locally recorded run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalScoreEntry {
    pub player_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub score: u64,
    /// Unix timestamp (ms)
    pub timestamp: u64,
}

/// Newest-first score log in key-value storage
#[derive(Debug, Clone)]
pub struct LocalScoreLedger<S> {
    store: S,
}

impl<S: KeyValueStore> LocalScoreLedger<S> {
    pub const SCORES_KEY: &'static str = "snowyLocalScores";
    pub const PLAYER_KEY: &'static str = "snowyLocalPlayerId";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored entries (empty when absent or corrupt)
    pub fn entries(&self) -> Vec<LocalScoreEntry> {
        match load_json::<Vec<LocalScoreEntry>>(&self.store, Self::SCORES_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                log::warn!("Discarding local score log: {e}");
                Vec::new()
            }
        }
    }

    /// Wallet address if connected, else this device's guest id
    pub fn player_id(&self, wallet: Option<&str>) -> String {
        if let Some(wallet) = wallet {
            return wallet.to_string();
        }
        match self.store.get(Self::PLAYER_KEY) {
            Ok(Some(id)) if !id.is_empty() => id,
            _ => {
                let id = format!("guest-{:012x}", rand::rng().random::<u64>() & 0xffff_ffff_ffff);
                if let Err(e) = self.store.set(Self::PLAYER_KEY, &id) {
                    log::warn!("Failed to persist guest id: {e}");
                }
                id
            }
        }
    }

    /// Record a finished run and report the player's runs today
    pub fn record(&self, score: u64, wallet: Option<&str>, now: u64) -> SubmitReceipt {
        let player_id = self.player_id(wallet);
        let mut entries = self.entries();
        entries.insert(
            0,
            LocalScoreEntry {
                player_id: player_id.clone(),
                wallet_address: wallet.map(str::to_string),
                score,
                timestamp: now,
            },
        );
        entries.truncate(MAX_LOCAL_SCORES);
        if let Err(e) = save_json(&self.store, Self::SCORES_KEY, &entries) {
            log::warn!("Failed to save local score log: {e}");
        }

        let daily_run_count = entries
            .iter()
            .filter(|e| e.player_id == player_id && Period::Daily.contains(e.timestamp, now))
            .count() as u32;
        SubmitReceipt { daily_run_count }
    }

    /// Stats for one player computed from the log
    pub fn stats(&self, wallet: Option<&str>, now: u64) -> UserStats {
        let player_id = self.player_id(wallet);
        let entries = self.entries();
        let mine: Vec<&LocalScoreEntry> = entries.iter().filter(|e| e.player_id == player_id).collect();
        let best_in = |period: Period| {
            mine.iter()
                .filter(|e| period.contains(e.timestamp, now))
                .map(|e| e.score)
                .max()
                .unwrap_or(0)
        };
        let daily_run_count = mine
            .iter()
            .filter(|e| Period::Daily.contains(e.timestamp, now))
            .count() as u32;
        let daily_rank = self
            .leaderboard(Period::Daily, usize::MAX, now)
            .iter()
            .find(|row| row.player_id == player_id)
            .map(|row| row.rank);

        UserStats {
            daily_run_count,
            daily_best_score: best_in(Period::Daily),
            weekly_best_score: best_in(Period::Weekly),
            all_time_best_score: best_in(Period::AllTime),
            daily_rank,
        }
    }

    /// Best score per player within the period, highest first
    pub fn leaderboard(&self, period: Period, limit: usize, now: u64) -> Vec<LeaderboardEntry> {
        let mut best: Vec<(String, u64)> = Vec::new();
        for entry in self.entries() {
            if !period.contains(entry.timestamp, now) {
                continue;
            }
            match best.iter_mut().find(|(id, _)| *id == entry.player_id) {
                Some((_, score)) => *score = (*score).max(entry.score),
                None => best.push((entry.player_id, entry.score)),
            }
        }
        // Stable sort keeps the most recent player first on ties
        best.sort_by(|a, b| b.1.cmp(&a.1));
        best.into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (player_id, score))| LeaderboardEntry {
                rank: i as u32 + 1,
                player_id,
                score,
            })
            .collect()
    }

    /// Highest score ever recorded on this device
    pub fn top_score(&self) -> Option<u64> {
        self.entries().iter().map(|e| e.score).max()
    }
}

/// Where a resolved answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Remote,
    Local,
}

/// A score-service answer, resolved against the local fallback
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreUpdate {
    Submitted {
        ticket: Ticket,
        receipt: SubmitReceipt,
        source: Source,
    },
    Stats {
        ticket: Ticket,
        stats: UserStats,
        source: Source,
    },
    Leaderboard {
        period: Period,
        rows: Vec<LeaderboardEntry>,
        source: Source,
    },
}

/// What a request needs to be answered locally if the service fails
#[derive(Debug)]
enum Pending {
    Submit {
        score: u64,
        wallet: Option<String>,
        ended_at: u64,
    },
    Stats {
        wallet: Option<String>,
    },
    Leaderboard {
        period: Period,
        limit: usize,
    },
}

/// Backend with a local fallback
pub struct ScoreService<B, S> {
    backend: B,
    ledger: LocalScoreLedger<S>,
    next_ticket: u64,
    pending: BTreeMap<Ticket, Pending>,
}

impl<B: ScoreBackend, S: KeyValueStore> ScoreService<B, S> {
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            ledger: LocalScoreLedger::new(store),
            next_ticket: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn ledger(&self) -> &LocalScoreLedger<S> {
        &self.ledger
    }

    /// Requests sent but not yet answered
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn issue(&mut self, request: ScoreRequest, pending: Pending) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket, pending);
        self.backend.send(ticket, request);
        ticket
    }

    /// Queue a finished run. The receipt arrives through [`poll`](Self::poll).
    pub fn submit(&mut self, score: u64, wallet: Option<&str>, ended_at: u64) -> Ticket {
        let wallet = wallet.map(str::to_string);
        self.issue(
            ScoreRequest::Submit {
                score,
                wallet: wallet.clone(),
            },
            Pending::Submit {
                score,
                wallet,
                ended_at,
            },
        )
    }

    pub fn request_stats(&mut self, wallet: Option<&str>) -> Ticket {
        let wallet = wallet.map(str::to_string);
        self.issue(
            ScoreRequest::Stats {
                wallet: wallet.clone(),
            },
            Pending::Stats { wallet },
        )
    }

    pub fn request_leaderboard(&mut self, period: Period, limit: usize) -> Ticket {
        self.issue(
            ScoreRequest::Leaderboard { period, limit },
            Pending::Leaderboard { period, limit },
        )
    }

    /// Resolve every reply that has arrived, oldest request first. Failed
    /// calls are answered from the local ledger.
    pub fn poll(&mut self, now: u64) -> Vec<ScoreUpdate> {
        let mut replies = self.backend.poll();
        replies.sort_by_key(|(ticket, _)| *ticket);
        replies
            .into_iter()
            .filter_map(|(ticket, reply)| self.resolve(ticket, reply, now))
            .collect()
    }

    fn resolve(&mut self, ticket: Ticket, reply: ScoreReply, now: u64) -> Option<ScoreUpdate> {
        let Some(pending) = self.pending.remove(&ticket) else {
            log::warn!("Dropping reply for unknown request {ticket:?}");
            return None;
        };
        let update = match (pending, reply) {
            (Pending::Submit { .. }, ScoreReply::Submitted(Ok(receipt))) => ScoreUpdate::Submitted {
                ticket,
                receipt,
                source: Source::Remote,
            },
            (Pending::Submit { score, wallet, ended_at }, reply) => {
                log::warn!("Score submit failed, recording locally: {}", reply.into_error());
                ScoreUpdate::Submitted {
                    ticket,
                    receipt: self.ledger.record(score, wallet.as_deref(), ended_at),
                    source: Source::Local,
                }
            }
            (Pending::Stats { .. }, ScoreReply::Stats(Ok(stats))) => ScoreUpdate::Stats {
                ticket,
                stats,
                source: Source::Remote,
            },
            (Pending::Stats { wallet }, reply) => {
                log::warn!("Stats fetch failed, using local log: {}", reply.into_error());
                ScoreUpdate::Stats {
                    ticket,
                    stats: self.ledger.stats(wallet.as_deref(), now),
                    source: Source::Local,
                }
            }
            (Pending::Leaderboard { period, .. }, ScoreReply::Leaderboard(Ok(rows))) => {
                ScoreUpdate::Leaderboard {
                    period,
                    rows,
                    source: Source::Remote,
                }
            }
            (Pending::Leaderboard { period, limit }, reply) => {
                log::warn!("Leaderboard fetch failed, using local log: {}", reply.into_error());
                ScoreUpdate::Leaderboard {
                    period,
                    rows: self.ledger.leaderboard(period, limit, now),
                    source: Source::Local,
                }
            }
        };
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const NOW: u64 = 1_700_000_000_000;

    /// Holds requests until the test releases a reply
    #[derive(Default)]
    struct ScriptedBackend {
        sent: Vec<(Ticket, ScoreRequest)>,
        ready: Vec<(Ticket, ScoreReply)>,
    }

    impl ScriptedBackend {
        fn answer(&mut self, ticket: Ticket, reply: ScoreReply) {
            self.ready.push((ticket, reply));
        }
    }

    impl ScoreBackend for ScriptedBackend {
        fn send(&mut self, ticket: Ticket, request: ScoreRequest) {
            self.sent.push((ticket, request));
        }

        fn poll(&mut self) -> Vec<(Ticket, ScoreReply)> {
            std::mem::take(&mut self.ready)
        }
    }

    fn receipt(count: u32) -> ScoreReply {
        ScoreReply::Submitted(Ok(SubmitReceipt {
            daily_run_count: count,
        }))
    }

    #[test]
    fn test_guest_id_is_stable() {
        let ledger = LocalScoreLedger::new(MemoryStore::new());
        let id = ledger.player_id(None);
        assert!(id.starts_with("guest-"));
        assert_eq!(ledger.player_id(None), id);
        assert_eq!(ledger.player_id(Some("0xwallet")), "0xwallet");
    }

    #[test]
    fn test_record_counts_today_only() {
        let ledger = LocalScoreLedger::new(MemoryStore::new());
        ledger.record(50, None, NOW - DAY_MS);
        assert_eq!(ledger.record(10, None, NOW).daily_run_count, 1);
        assert_eq!(ledger.record(20, None, NOW + 1).daily_run_count, 2);
        assert_eq!(ledger.entries()[0].score, 20);
    }

    #[test]
    fn test_log_is_capped() {
        let ledger = LocalScoreLedger::new(MemoryStore::new());
        for i in 0..(MAX_LOCAL_SCORES as u64 + 5) {
            ledger.record(i, None, NOW);
        }
        let entries = ledger.entries();
        assert_eq!(entries.len(), MAX_LOCAL_SCORES);
        assert_eq!(entries[0].score, MAX_LOCAL_SCORES as u64 + 4);
    }

    #[test]
    fn test_stats_windows() {
        let ledger = LocalScoreLedger::new(MemoryStore::new());
        ledger.record(900, Some("w"), NOW - 30 * DAY_MS);
        ledger.record(400, Some("w"), NOW - 3 * DAY_MS);
        ledger.record(120, Some("w"), NOW);
        ledger.record(300, Some("other"), NOW);

        let stats = ledger.stats(Some("w"), NOW);
        assert_eq!(stats.daily_run_count, 1);
        assert_eq!(stats.daily_best_score, 120);
        assert_eq!(stats.weekly_best_score, 400);
        assert_eq!(stats.all_time_best_score, 900);
        assert_eq!(stats.daily_rank, Some(2));
    }

    #[test]
    fn test_leaderboard_best_per_player() {
        let ledger = LocalScoreLedger::new(MemoryStore::new());
        ledger.record(100, Some("a"), NOW);
        ledger.record(250, Some("b"), NOW);
        ledger.record(300, Some("a"), NOW);
        ledger.record(999, Some("c"), NOW - 10 * DAY_MS);

        let daily = ledger.leaderboard(Period::Daily, 10, NOW);
        assert_eq!(daily.len(), 2);
        assert_eq!((daily[0].player_id.as_str(), daily[0].score, daily[0].rank), ("a", 300, 1));
        assert_eq!((daily[1].player_id.as_str(), daily[1].rank), ("b", 2));

        let all_time = ledger.leaderboard(Period::AllTime, 1, NOW);
        assert_eq!(all_time[0].score, 999);
        assert_eq!(ledger.top_score(), Some(999));
    }

    #[test]
    fn test_corrupt_log_starts_fresh() {
        let store = MemoryStore::new();
        store
            .set(LocalScoreLedger::<MemoryStore>::SCORES_KEY, "not json")
            .unwrap();
        let ledger = LocalScoreLedger::new(store);
        assert!(ledger.entries().is_empty());
        assert_eq!(ledger.record(5, None, NOW).daily_run_count, 1);
    }

    #[test]
    fn test_service_falls_back_when_offline() {
        let mut service = ScoreService::new(OfflineBackend::default(), MemoryStore::new());
        service.submit(42, None, NOW);
        service.submit(43, None, NOW);
        service.request_stats(None);
        service.request_leaderboard(Period::Daily, 5);
        assert_eq!(service.in_flight(), 4);

        let updates = service.poll(NOW);
        assert_eq!(service.in_flight(), 0);
        assert_eq!(updates.len(), 4);
        let counts: Vec<u32> = updates
            .iter()
            .filter_map(|u| match u {
                ScoreUpdate::Submitted { receipt, source, .. } => {
                    assert_eq!(*source, Source::Local);
                    Some(receipt.daily_run_count)
                }
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![1, 2]);
        assert!(matches!(
            &updates[2],
            ScoreUpdate::Stats { stats, source: Source::Local, .. } if stats.daily_best_score == 43
        ));
        assert!(matches!(
            &updates[3],
            ScoreUpdate::Leaderboard { rows, source: Source::Local, .. } if rows.len() == 1
        ));
    }

    #[test]
    fn test_submit_does_not_wait_for_reply() {
        let mut service = ScoreService::new(ScriptedBackend::default(), MemoryStore::new());
        let ticket = service.submit(42, Some("w"), NOW);
        assert_eq!(
            service.backend.sent,
            vec![(ticket, ScoreRequest::Submit { score: 42, wallet: Some("w".to_string()) })]
        );
        assert!(service.poll(NOW).is_empty());
        assert_eq!(service.in_flight(), 1);

        service.backend.answer(ticket, receipt(7));
        assert_eq!(
            service.poll(NOW + 500),
            vec![ScoreUpdate::Submitted {
                ticket,
                receipt: SubmitReceipt { daily_run_count: 7 },
                source: Source::Remote,
            }]
        );
        assert!(service.ledger().entries().is_empty());
    }

    #[test]
    fn test_replies_resolve_oldest_request_first() {
        let mut service = ScoreService::new(ScriptedBackend::default(), MemoryStore::new());
        let first = service.submit(10, None, NOW);
        let second = service.submit(20, None, NOW + 1);
        service.backend.answer(second, receipt(2));
        service.backend.answer(first, receipt(1));

        let tickets: Vec<Ticket> = service
            .poll(NOW + 2)
            .into_iter()
            .map(|u| match u {
                ScoreUpdate::Submitted { ticket, .. } => ticket,
                other => panic!("unexpected update {other:?}"),
            })
            .collect();
        assert_eq!(tickets, vec![first, second]);
    }

    #[test]
    fn test_failed_submit_recorded_at_run_end() {
        let mut service = ScoreService::new(ScriptedBackend::default(), MemoryStore::new());
        let ticket = service.submit(42, None, NOW - DAY_MS);
        service.backend.answer(
            ticket,
            ScoreReply::Submitted(Err(BackendError::Rejected("rate limited".to_string()))),
        );

        let updates = service.poll(NOW);
        // the run belongs to yesterday, so it is the only one that day
        assert!(matches!(
            updates[0],
            ScoreUpdate::Submitted { receipt: SubmitReceipt { daily_run_count: 1 }, source: Source::Local, .. }
        ));
        assert_eq!(service.ledger().entries()[0].timestamp, NOW - DAY_MS);
        assert_eq!(service.ledger().stats(None, NOW).daily_run_count, 0);
    }

    #[test]
    fn test_mismatched_reply_falls_back() {
        let mut service = ScoreService::new(ScriptedBackend::default(), MemoryStore::new());
        service.ledger().record(80, None, NOW);
        let ticket = service.request_leaderboard(Period::AllTime, 3);
        service.backend.answer(ticket, receipt(3));
        assert!(matches!(
            &service.poll(NOW)[0],
            ScoreUpdate::Leaderboard { rows, source: Source::Local, .. } if rows[0].score == 80
        ));
    }

    #[test]
    fn test_unknown_ticket_is_dropped() {
        let mut service = ScoreService::new(ScriptedBackend::default(), MemoryStore::new());
        service.backend.answer(Ticket(99), receipt(5));
        assert!(service.poll(NOW).is_empty());
        assert!(service.ledger().entries().is_empty());
    }

    #[test]
    fn test_server_json_shapes() {
        let receipt: SubmitReceipt = serde_json::from_str(
            r#"{"id":5,"score":120,"dailyRunCount":3,"date":"2026-10-19"}"#,
        )
        .unwrap();
        assert_eq!(receipt.daily_run_count, 3);
        assert_eq!(
            serde_json::to_string(&receipt).unwrap(),
            r#"{"dailyRunCount":3}"#
        );

        let stats: UserStats = serde_json::from_str(
            r#"{"dailyRunCount":2,"dailyBestScore":50,"weeklyBestScore":70,"allTimeBestScore":90,"dailyRank":null}"#,
        )
        .unwrap();
        assert_eq!(
            stats,
            UserStats {
                daily_run_count: 2,
                daily_best_score: 50,
                weekly_best_score: 70,
                all_time_best_score: 90,
                daily_rank: None,
            }
        );
        let json = serde_json::to_value(UserStats {
            daily_rank: Some(4),
            ..stats
        })
        .unwrap();
        assert_eq!(json["allTimeBestScore"], 90);
        assert_eq!(json["dailyRank"], 4);
        assert_eq!(serde_json::from_value::<UserStats>(json).unwrap().daily_rank, Some(4));
    }

    #[test]
    fn test_period_boundaries() {
        let midnight = 20_000 * DAY_MS;
        assert!(Period::Daily.contains(midnight, midnight + DAY_MS - 1));
        assert!(!Period::Daily.contains(midnight - 1, midnight));
        assert!(Period::Weekly.contains(midnight - WEEK_MS, midnight));
        assert!(!Period::Weekly.contains(midnight - WEEK_MS - 1, midnight));
    }
}
