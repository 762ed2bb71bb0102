use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use scope_core::MatchRecord;

use super::{parse_matches_payload, MatchSource, SourceError};

/// Reads match history from a JSON file on every call.
///
/// The file holds either a single player's list (any shape accepted by
/// [`parse_matches_payload`]) or an object keyed by player id.
pub struct JsonFileMatchSource {
    path: PathBuf,
}

impl JsonFileMatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MatchSource for JsonFileMatchSource {
    async fn fetch_recent(
        &self,
        player_id: &str,
        count: usize,
    ) -> Result<Vec<MatchRecord>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let payload: Value =
            serde_json::from_str(&raw).map_err(|e| SourceError::Parse(e.to_string()))?;

        let payload = match payload {
            Value::Object(mut map) if map.contains_key(player_id) => {
                map.remove(player_id).unwrap_or(Value::Null)
            }
            other => other,
        };

        let mut matches = parse_matches_payload(payload)?;
        matches.truncate(count);
        Ok(matches)
    }
}
