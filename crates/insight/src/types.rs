use chrono::{DateTime, Utc};
use serde::Serialize;

use scope_core::AxisResult;

/// Status reported when the full match window was scored.
pub const STATUS_READY: &str = "READY";

/// Backend label for answers that never reached the generation chain.
pub const NO_BACKEND: &str = "none";

/// One scored axis with the backend that wrote its narrative.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisReport {
    #[serde(flatten)]
    pub result: AxisResult,
    pub narrative_backend: String,
}

/// All eight axes for one player.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultlinesReport {
    pub request_id: String,
    pub player_id: String,
    /// `READY`, an ingestion status, or `NO_MATCHES`.
    pub status: String,
    pub match_count: usize,
    pub generated_at: DateTime<Utc>,
    pub axes: Vec<AxisReport>,
}

impl FaultlinesReport {
    pub fn is_ready(&self) -> bool {
        self.status == STATUS_READY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInsight {
    pub topic: String,
    pub insight: String,
    pub backend_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub backend_used: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("conversation has no user message to answer")]
    EmptyConversation,
}
