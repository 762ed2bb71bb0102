//! Match source boundary: where already-ingested match history comes from.
//!
//! Retry and backoff live here, in the concrete sources; the extractor above
//! calls `fetch_recent` exactly once per request.

pub mod file;
pub mod http;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use scope_core::MatchRecord;

pub use file::JsonFileMatchSource;
pub use http::HttpMatchSource;

/// Supplies the most recent matches for a player, most recent first.
#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn fetch_recent(
        &self,
        player_id: &str,
        count: usize,
    ) -> Result<Vec<MatchRecord>, SourceError>;
}

/// Ingestion state of a player's match history on the storage side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestionStatus {
    NotStarted,
    Fetching,
    Ready,
    Failed,
    Unknown,
}

impl IngestionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NOT_STARTED" => IngestionStatus::NotStarted,
            "FETCHING" => IngestionStatus::Fetching,
            "READY" => IngestionStatus::Ready,
            "FAILED" | "ERROR" => IngestionStatus::Failed,
            _ => IngestionStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionStatus::NotStarted => "NOT_STARTED",
            IngestionStatus::Fetching => "FETCHING",
            IngestionStatus::Ready => "READY",
            IngestionStatus::Failed => "FAILED",
            IngestionStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for IngestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("match history not ready (status: {0})")]
    NotReady(IngestionStatus),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source not configured: {0}")]
    NotConfigured(String),
}

/// Decode a match list payload.
///
/// Accepts a bare array, `{"matches": [...]}`, or the relay-wrapped
/// `{"body": "<json string>"}` / `{"body": {...}}` shapes.
pub fn parse_matches_payload(payload: Value) -> Result<Vec<MatchRecord>, SourceError> {
    let list = match payload {
        Value::Array(_) => payload,
        Value::Object(mut map) => {
            if let Some(matches) = map.remove("matches") {
                matches
            } else if let Some(body) = map.remove("body") {
                let body = match body {
                    Value::String(raw) => serde_json::from_str(&raw)
                        .map_err(|e| SourceError::Parse(format!("wrapped body: {e}")))?,
                    other => other,
                };
                return parse_matches_payload(body);
            } else {
                Value::Array(Vec::new())
            }
        }
        Value::Null => Value::Array(Vec::new()),
        other => {
            return Err(SourceError::Parse(format!(
                "expected match list, got {}",
                json_kind(&other)
            )))
        }
    };

    serde_json::from_value(list).map_err(|e| SourceError::Parse(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// In-memory source for tests in this and downstream crates.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Serves fixed match lists per player and counts calls.
    #[derive(Default)]
    pub struct MockMatchSource {
        players: Mutex<HashMap<String, Vec<MatchRecord>>>,
        statuses: Mutex<HashMap<String, IngestionStatus>>,
        calls: AtomicUsize,
    }

    impl MockMatchSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_player(self, player_id: &str, matches: Vec<MatchRecord>) -> Self {
            self.players
                .lock()
                .unwrap()
                .insert(player_id.to_string(), matches);
            self
        }

        pub fn with_status(self, player_id: &str, status: IngestionStatus) -> Self {
            self.statuses
                .lock()
                .unwrap()
                .insert(player_id.to_string(), status);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MatchSource for MockMatchSource {
        async fn fetch_recent(
            &self,
            player_id: &str,
            count: usize,
        ) -> Result<Vec<MatchRecord>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.statuses.lock().unwrap().get(player_id) {
                if *status != IngestionStatus::Ready {
                    return Err(SourceError::NotReady(*status));
                }
            }
            let players = self.players.lock().unwrap();
            let mut matches = players.get(player_id).cloned().unwrap_or_default();
            matches.truncate(count);
            Ok(matches)
        }
    }
}
