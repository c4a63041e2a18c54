//! Snowy Run entry point
//!
//! On the web this exposes the session to the page's frame loop. Natively it
//! runs a headless autopilot demo against file-backed storage.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use snowy_run::platform::now_ms;
    use snowy_run::remote::{FetchBackend, ScoreApi};
    use snowy_run::scores::Period;
    use snowy_run::sim::{Controls, TickInput};
    use snowy_run::storage::LocalStore;
    use snowy_run::{LocalScoreLedger, Settings, Session, UpgradeKind};

    type WebSession = Session<FetchBackend, LocalStore>;

    thread_local! {
        static SESSION: RefCell<Option<WebSession>> = const { RefCell::new(None) };
    }

    fn with_session<T: Default>(f: impl FnOnce(&mut WebSession) -> T) -> T {
        SESSION.with(|cell| cell.borrow_mut().as_mut().map(f).unwrap_or_default())
    }

    fn to_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string(value).unwrap_or_else(|e| {
            log::warn!("Failed to serialize: {e}");
            "null".to_string()
        })
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger already set: {e}").into());
        }
        log::info!("Snowy Run starting...");

        let settings = Settings::load(&LocalStore);
        let api = match &settings.api_url {
            Some(url) => ScoreApi::new(url.clone()),
            None => FetchBackend::same_origin(),
        };
        let guest = LocalScoreLedger::new(LocalStore).player_id(None);
        let backend = FetchBackend::new(api.with_session(guest));
        let session = Session::new(settings, backend, LocalStore, now_ms());
        SESSION.with(|cell| *cell.borrow_mut() = Some(session));
    }

    /// Step one frame; returns the frame's events as JSON
    #[wasm_bindgen]
    pub fn frame(idle_mode: bool, jump: bool, slide: bool, dash: bool) -> String {
        with_session(|s| {
            let input = TickInput {
                now: now_ms(),
                controls: Controls { jump, slide, dash },
                idle_mode,
            };
            to_json(&s.frame(&input))
        })
    }

    /// Latest snapshot as JSON for the renderer
    #[wasm_bindgen]
    pub fn snapshot() -> String {
        with_session(|s| to_json(s.game().state()))
    }

    #[wasm_bindgen]
    pub fn start_game() -> bool {
        with_session(|s| s.game_mut().start_game(now_ms()))
    }

    #[wasm_bindgen]
    pub fn jump() -> bool {
        with_session(|s| s.game_mut().jump(now_ms()))
    }

    #[wasm_bindgen]
    pub fn slide() -> bool {
        with_session(|s| s.game_mut().slide(now_ms()))
    }

    #[wasm_bindgen]
    pub fn dash() -> bool {
        with_session(|s| s.game_mut().dash(now_ms()))
    }

    #[wasm_bindgen]
    pub fn pause_game() {
        with_session(|s| s.game_mut().pause_game())
    }

    #[wasm_bindgen]
    pub fn can_play() -> bool {
        with_session(|s| s.game().can_play())
    }

    /// Claim the shown loot; returns its label (empty when there is none)
    #[wasm_bindgen]
    pub fn claim_lootbox() -> String {
        with_session(|s| s.game_mut().claim_lootbox().map(|l| l.label()).unwrap_or_default())
    }

    /// Buy an upgrade by its wire name (e.g. "startSpeed"); returns points spent or -1
    #[wasm_bindgen]
    pub fn purchase_upgrade(kind: &str) -> f64 {
        let Ok(kind) = serde_json::from_value::<UpgradeKind>(serde_json::Value::from(kind)) else {
            log::warn!("Unknown upgrade {kind}");
            return -1.0;
        };
        with_session(|s| match s.game_mut().purchase_upgrade(kind, now_ms()) {
            Ok(spent) => spent as f64,
            Err(e) => {
                log::info!("Purchase rejected: {e}");
                -1.0
            }
        })
    }

    #[wasm_bindgen]
    pub fn next_level_score() -> f64 {
        with_session(|s| s.game().next_level_score().map_or(-1.0, |v| v as f64))
    }

    /// Last known stats as JSON; a fresh copy arrives on a later frame
    #[wasm_bindgen]
    pub fn user_stats() -> String {
        with_session(|s| {
            s.refresh_stats();
            to_json(s.stats())
        })
    }

    /// Last received leaderboard as JSON; also asks for a newer one
    #[wasm_bindgen]
    pub fn leaderboard(period: &str, limit: usize) -> String {
        let period = match period {
            "weekly" => Period::Weekly,
            "alltime" => Period::AllTime,
            _ => Period::Daily,
        };
        with_session(|s| {
            s.request_leaderboard(period, limit);
            to_json(&s.leaderboard(period))
        })
    }

    /// Page unload
    #[wasm_bindgen]
    pub fn shutdown() {
        with_session(|s| s.shutdown(now_ms()))
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use snowy_run::platform::now_ms;
    use snowy_run::remote::{HttpBackend, ScoreApi};
    use snowy_run::scores::OfflineBackend;
    use snowy_run::storage::FileStore;
    use snowy_run::{LocalScoreLedger, Session, Settings};

    env_logger::init();
    log::info!("Snowy Run (native) starting...");

    let data_dir = std::env::var("SNOWY_DATA_DIR").unwrap_or_else(|_| "snowy-data".to_string());
    let runs: u32 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(3);

    let store = FileStore::new(data_dir);
    let settings = Settings::load(&store);
    let api_url = std::env::var("SNOWY_API_URL")
        .ok()
        .or_else(|| settings.api_url.clone());
    // Simulated clock starting at wall time so daily stats line up
    let now = now_ms();
    match api_url {
        Some(url) => {
            let guest = LocalScoreLedger::new(store.clone()).player_id(None);
            let backend = HttpBackend::spawn(ScoreApi::new(url).with_session(guest));
            demo::run(Session::new(settings, backend, store, now), runs, now);
        }
        None => {
            log::info!("No score service configured; playing offline");
            demo::run(
                Session::new(settings, OfflineBackend::default(), store, now),
                runs,
                now,
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::time::{Duration, Instant};

    use snowy_run::consts::FRAME_MS;
    use snowy_run::scores::Period;
    use snowy_run::sim::TickInput;
    use snowy_run::storage::FileStore;
    use snowy_run::{ScoreBackend, Session};

    /// How long to wait for the closing leaderboard
    const REPLY_WAIT: Duration = Duration::from_secs(10);

    /// Headless autopilot runs, then the all-time leaderboard
    pub fn run<B: ScoreBackend>(mut session: Session<B, FileStore>, runs: u32, mut now: u64) {
        for run in 1..=runs {
            if !session.game_mut().start_game(now) {
                println!("Daily run limit reached");
                break;
            }
            // two minutes of frames at most
            for _ in 0..7_500 {
                now += FRAME_MS;
                let input = TickInput {
                    now,
                    idle_mode: true,
                    ..Default::default()
                };
                session.frame(&input);
                if session.game().state().is_game_over() {
                    break;
                }
            }
            let state = session.game().state();
            println!(
                "Run {run}: {} points, level {} ({}), {} runs today",
                state.score,
                state.level_index + 1,
                session.game().current_level().name,
                session.game().daily_run_count()
            );
            if let Some(loot) = session.game_mut().claim_lootbox() {
                println!("  loot box: {}", loot.label());
            }
            now += 1_000;
        }

        session.request_leaderboard(Period::AllTime, 5);
        let deadline = Instant::now() + REPLY_WAIT;
        while session.pending_requests() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(FRAME_MS));
            session.pump(now);
        }
        for row in session.leaderboard(Period::AllTime) {
            println!("#{} {} {}", row.rank, row.player_id, row.score);
        }
        session.shutdown(now);
    }
}
