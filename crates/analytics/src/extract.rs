use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use scope_core::{MatchRecord, Outcome};

use crate::source::{IngestionStatus, MatchSource, SourceError};

/// Why no analysis could be produced for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum DataUnavailable {
    #[error("no match history for this player")]
    NoMatches,
    #[error("match history not ready (status: {0})")]
    NotReady(IngestionStatus),
    #[error("match source failed: {0}")]
    SourceFailed(String),
}

impl DataUnavailable {
    /// Status label reported alongside an empty analysis.
    pub fn status_label(&self) -> &'static str {
        match self {
            DataUnavailable::NoMatches => "NO_MATCHES",
            DataUnavailable::NotReady(status) => status.as_str(),
            DataUnavailable::SourceFailed(_) => "FAILED",
        }
    }
}

impl From<SourceError> for DataUnavailable {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotReady(status) => DataUnavailable::NotReady(status),
            other => DataUnavailable::SourceFailed(other.to_string()),
        }
    }
}

/// Pulls the player's recent match window from the source. Performs no retries.
pub struct MetricExtractor {
    source: Arc<dyn MatchSource>,
    window: usize,
}

impl MetricExtractor {
    pub fn new(source: Arc<dyn MatchSource>, window: usize) -> Self {
        Self {
            source,
            window: window.max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub async fn recent_matches(&self, player_id: &str) -> Result<MatchWindow, DataUnavailable> {
        let mut matches = self
            .source
            .fetch_recent(player_id, self.window)
            .await
            .map_err(|e| {
                warn!(player = %player_id, error = %e, "match history unavailable");
                DataUnavailable::from(e)
            })?;

        if matches.is_empty() {
            info!(player = %player_id, "no matches on record");
            return Err(DataUnavailable::NoMatches);
        }

        matches.truncate(self.window);
        info!(player = %player_id, matches = matches.len(), "match window extracted");
        Ok(MatchWindow::new(matches))
    }
}

/// A player's recent matches, stored most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchWindow {
    matches: Vec<MatchRecord>,
}

impl MatchWindow {
    pub fn new(matches: Vec<MatchRecord>) -> Self {
        Self { matches }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn most_recent_first(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// Oldest match first.
    pub fn chronological(&self) -> impl DoubleEndedIterator<Item = &MatchRecord> + ExactSizeIterator {
        self.matches.iter().rev()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.chronological().map(MatchRecord::outcome).collect()
    }

    pub fn wins(&self) -> usize {
        self.matches.iter().filter(|m| m.win).count()
    }

    /// Evaluate a per-match field in chronological order.
    pub fn field<F>(&self, extract: F) -> FieldSeries
    where
        F: Fn(&MatchRecord) -> Option<f64>,
    {
        FieldSeries {
            values: self.chronological().map(extract).collect(),
        }
    }
}

/// Per-match values of one field; `None` where the match lacks it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSeries {
    values: Vec<Option<f64>>,
}

impl FieldSeries {
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// True when no match carries the field at all.
    pub fn is_absent(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    pub fn present(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    /// Mean over the matches that carry the field; `None` if structurally absent.
    pub fn mean(&self) -> Option<f64> {
        crate::stats::mean(&self.present())
    }
}
