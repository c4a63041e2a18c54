//! HTTP score service
//!
//! The wire layer is shared by both transports: [`ScoreApi`] turns a
//! [`ScoreRequest`] into an [`ApiCall`] and [`parse_reply`] turns the response
//! body back into a [`ScoreReply`]. Natively a worker thread performs the
//! calls; in the browser they go through `fetch`.

use serde::{Deserialize, Serialize};

use crate::scores::{
    BackendError, LeaderboardEntry, Period, ScoreReply, ScoreRequest, SubmitReceipt, UserStats,
};

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::HttpBackend;
#[cfg(target_arch = "wasm32")]
pub use web::FetchBackend;

/// API base used when the page origin is unknown
pub const DEFAULT_API_BASE: &str = "http://localhost:3001/api";

/// Header carrying the guest session for players without a wallet
pub const SESSION_HEADER: &str = "X-Session-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One HTTP request, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub method: Method,
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    /// JSON body (POST only)
    pub body: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    score: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_address: Option<&'a str>,
}

/// Endpoint layout of the score service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreApi {
    base_url: String,
    session_id: Option<String>,
}

impl ScoreApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: None,
        }
    }

    /// Send `session_id` with every call so guest runs are attributed
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn call(&self, request: &ScoreRequest) -> Result<ApiCall, BackendError> {
        let call = match request {
            ScoreRequest::Submit { score, wallet } => {
                let body = SubmitBody {
                    score: *score,
                    wallet_address: wallet.as_deref(),
                };
                ApiCall {
                    method: Method::Post,
                    url: format!("{}/game/submit-score", self.base_url),
                    query: Vec::new(),
                    body: Some(
                        serde_json::to_string(&body)
                            .map_err(|e| BackendError::Malformed(e.to_string()))?,
                    ),
                }
            }
            ScoreRequest::Stats { wallet } => ApiCall {
                method: Method::Get,
                url: format!("{}/game/user-stats", self.base_url),
                query: wallet
                    .iter()
                    .map(|w| ("walletAddress", w.clone()))
                    .collect(),
                body: None,
            },
            ScoreRequest::Leaderboard { period, limit } => ApiCall {
                method: Method::Get,
                url: format!("{}/game/leaderboard", self.base_url),
                query: vec![
                    ("type", period.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
                body: None,
            },
        };
        Ok(call)
    }
}

/// Leaderboard response; rows use the database's column names
#[derive(Deserialize)]
struct LeaderboardBody {
    leaderboard: Vec<LeaderboardRow>,
}

#[derive(Deserialize)]
struct LeaderboardRow {
    rank: u32,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    wallet_address: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    daily_score: u64,
    #[serde(default)]
    weekly_score: u64,
    #[serde(default)]
    all_time_score: u64,
}

impl LeaderboardRow {
    fn into_entry(self, period: Period) -> LeaderboardEntry {
        let score = match period {
            Period::Daily => self.daily_score,
            Period::Weekly => self.weekly_score,
            Period::AllTime => self.all_time_score,
        };
        let player_id = self
            .nickname
            .or(self.wallet_address)
            .or(self.session_id)
            .unwrap_or_else(|| "anonymous".to_string());
        LeaderboardEntry {
            rank: self.rank,
            player_id,
            score,
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))
}

/// Decode a successful response body for `request`
pub fn parse_reply(request: &ScoreRequest, body: &str) -> ScoreReply {
    match request {
        ScoreRequest::Submit { .. } => ScoreReply::Submitted(decode::<SubmitReceipt>(body)),
        ScoreRequest::Stats { .. } => ScoreReply::Stats(decode::<UserStats>(body)),
        ScoreRequest::Leaderboard { period, .. } => {
            ScoreReply::Leaderboard(decode::<LeaderboardBody>(body).map(|b| {
                b.leaderboard
                    .into_iter()
                    .map(|row| row.into_entry(*period))
                    .collect()
            }))
        }
    }
}

/// Turn an error response into a rejection, using its `error` message when present
pub fn rejection(status: u16, body: &str) -> BackendError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) => BackendError::Rejected(format!("{status}: {}", e.error)),
        Err(_) => BackendError::Rejected(format!("HTTP {status}")),
    }
}
