use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use scope_analytics::axes::{score_all, unavailable, AxisScorer};
use scope_analytics::profile::build_profile_summary;
use scope_analytics::{DataUnavailable, MatchWindow, MetricExtractor, ProfileCache, ProfileService};
use scope_core::config::AnalysisConfig;
use scope_core::{AxisKey, AxisResult};
use scope_llm::{BackendChain, GenerationRequest, Message, Role};

use crate::topics::{
    axis_context, history_context, narrative_context, playstyle_context, Topic, NARRATIVE_QUERY,
};
use crate::types::{
    AxisReport, ChatReply, FaultlinesReport, InsightError, TopicInsight, NO_BACKEND, STATUS_READY,
};

const NARRATIVE_MAX_TOKENS: u32 = 40;
const NARRATIVE_TEMPERATURE: f32 = 0.6;
const TOPIC_MAX_TOKENS: u32 = 1000;
const TOPIC_TEMPERATURE: f32 = 0.7;

const NO_PROFILE_CONTEXT: &str = "No player profile is available; answer from general game knowledge.";
const DEFAULT_CHAT_CONTEXT: &str = "You are an AI strategist analyzing gameplay.";

/// Turns scored match data into narrated reports, topic insights and chat replies.
pub struct Orchestrator {
    extractor: Arc<MetricExtractor>,
    profiles: ProfileService,
    scorers: Vec<Box<dyn AxisScorer>>,
    chain: BackendChain,
}

impl Orchestrator {
    pub fn new(
        extractor: Arc<MetricExtractor>,
        cache: ProfileCache,
        analysis: &AnalysisConfig,
        chain: BackendChain,
    ) -> Self {
        Self {
            profiles: ProfileService::new(cache, extractor.clone()),
            scorers: scope_analytics::scorers(analysis),
            extractor,
            chain,
        }
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    pub fn chain(&self) -> &BackendChain {
        &self.chain
    }

    /// Score every axis for `player_id` and narrate each through the chain.
    ///
    /// Missing history is reported in the result, never as an error.
    pub async fn faultlines(&self, player_id: &str) -> FaultlinesReport {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        info!(request_id = %request_id, player = %player_id, "faultlines requested");

        let window = match self.extractor.recent_matches(player_id).await {
            Ok(window) => window,
            Err(reason) => {
                warn!(request_id = %request_id, player = %player_id, reason = %reason, "faultlines without history");
                let axes = unavailable(&self.scorers, &reason)
                    .into_iter()
                    .map(|result| AxisReport {
                        result,
                        narrative_backend: NO_BACKEND.to_string(),
                    })
                    .collect();
                return FaultlinesReport {
                    request_id,
                    player_id: player_id.to_string(),
                    status: reason.status_label().to_string(),
                    match_count: 0,
                    generated_at: Utc::now(),
                    axes,
                };
            }
        };

        self.remember_profile(player_id, &window);
        let results = score_all(&self.scorers, &window);

        let requests: Vec<GenerationRequest> = results
            .iter()
            .map(|result| {
                GenerationRequest::new(narrative_context(result), NARRATIVE_QUERY)
                    .max_tokens(NARRATIVE_MAX_TOKENS)
                    .temperature(NARRATIVE_TEMPERATURE)
            })
            .collect();
        let narratives = self.chain.generate_batch(&requests).await;

        let axes: Vec<AxisReport> = results
            .into_iter()
            .zip(narratives)
            .map(|(mut result, generated)| {
                result.narrative = generated.text.trim().to_string();
                AxisReport {
                    result,
                    narrative_backend: generated.backend_used,
                }
            })
            .collect();

        info!(
            request_id = %request_id,
            player = %player_id,
            matches = window.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "faultlines complete"
        );

        FaultlinesReport {
            request_id,
            player_id: player_id.to_string(),
            status: STATUS_READY.to_string(),
            match_count: window.len(),
            generated_at: Utc::now(),
            axes,
        }
    }

    /// Deep-dive insight on one topic: an axis, a battle-history or playstyle
    /// topic, or any free-form subject answered from the player's profile.
    pub async fn topic_insight(&self, player_id: &str, raw_topic: &str) -> TopicInsight {
        let request_id = Uuid::new_v4().to_string();
        let topic = Topic::parse(raw_topic);
        info!(request_id = %request_id, player = %player_id, topic = %topic.title(), "topic insight requested");

        let context = if topic.needs_matches() {
            let window = match self.extractor.recent_matches(player_id).await {
                Ok(window) => window,
                Err(reason) => return self.no_history(&topic, &reason),
            };
            self.remember_profile(player_id, &window);
            match &topic {
                Topic::Axis(axis) => match self.score_axis(*axis, &window) {
                    Some(result) => axis_context(&result, &window),
                    None => self.profile_context(player_id).await,
                },
                Topic::History(history) => history_context(*history, &window),
                Topic::Playstyle(playstyle) => playstyle_context(*playstyle, &window),
                Topic::AdHoc(_) => self.profile_context(player_id).await,
            }
        } else {
            self.profile_context(player_id).await
        };

        let request = GenerationRequest::new(context, topic.query(self.extractor.window()))
            .max_tokens(TOPIC_MAX_TOKENS)
            .temperature(TOPIC_TEMPERATURE);
        let generated = self.chain.generate(&request).await;

        info!(request_id = %request_id, backend = %generated.backend_used, "topic insight complete");
        TopicInsight {
            topic: topic.title().to_string(),
            insight: generated.text,
            backend_used: generated.backend_used,
        }
    }

    /// Answer the last user message, with the player's profile and the
    /// earlier turns as context.
    pub async fn chat(
        &self,
        messages: &[Message],
        player_id: Option<&str>,
    ) -> Result<ChatReply, InsightError> {
        let (last, history) = messages.split_last().ok_or(InsightError::EmptyConversation)?;
        if last.role != Role::User || last.content.trim().is_empty() {
            return Err(InsightError::EmptyConversation);
        }

        let request_id = Uuid::new_v4().to_string();
        info!(
            request_id = %request_id,
            messages = messages.len(),
            with_player = player_id.is_some(),
            "chat requested"
        );

        let mut parts = Vec::new();
        if let Some(player_id) = player_id {
            if let Some(profile) = self.profiles.get(player_id).await {
                parts.push(profile);
            }
        }

        let turns: Vec<String> = history
            .iter()
            .filter_map(|m| match m.role {
                Role::User => Some(format!("User: {}", m.content)),
                Role::Assistant => Some(format!("Assistant: {}", m.content)),
                Role::System => None,
            })
            .collect();
        if !turns.is_empty() {
            parts.push(format!("# Previous Conversation:\n{}", turns.join("\n")));
        }

        let context = if parts.is_empty() {
            DEFAULT_CHAT_CONTEXT.to_string()
        } else {
            parts.join("\n\n")
        };

        let generated = self
            .chain
            .generate(&GenerationRequest::new(context, last.content.clone()))
            .await;

        info!(request_id = %request_id, backend = %generated.backend_used, "chat complete");
        Ok(ChatReply {
            reply: generated.text,
            backend_used: generated.backend_used,
        })
    }

    fn score_axis(&self, key: AxisKey, window: &MatchWindow) -> Option<AxisResult> {
        self.scorers
            .iter()
            .find(|scorer| scorer.key() == key)
            .map(|scorer| scorer.score(window))
    }

    /// Seed the profile cache from a window already in hand.
    fn remember_profile(&self, player_id: &str, window: &MatchWindow) {
        let cache = self.profiles.cache();
        if cache.get_fresh(player_id).is_none() {
            cache.insert(player_id, build_profile_summary(window));
        }
    }

    async fn profile_context(&self, player_id: &str) -> String {
        self.profiles
            .get(player_id)
            .await
            .unwrap_or_else(|| NO_PROFILE_CONTEXT.to_string())
    }

    fn no_history(&self, topic: &Topic, reason: &DataUnavailable) -> TopicInsight {
        warn!(topic = %topic.title(), reason = %reason, "topic insight without history");
        TopicInsight {
            topic: topic.title().to_string(),
            insight: format!("Insufficient match history: {reason}."),
            backend_used: NO_BACKEND.to_string(),
        }
    }
}
