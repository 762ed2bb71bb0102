//! Ordered fallback across generation backends.

use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::provider::{BackendFailure, GenerationBackend, GenerationRequest, TerminalBackend};

/// Reported when even the terminal backend returns nothing.
pub const UNAVAILABLE_TEXT: &str = "Insight temporarily unavailable.";
pub const UNAVAILABLE_BACKEND: &str = "unavailable";

/// A network backend with its own deadline.
pub struct Tier {
    pub backend: Box<dyn GenerationBackend>,
    pub timeout: Duration,
}

impl Tier {
    pub fn new(backend: Box<dyn GenerationBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }
}

/// A tier that did not produce the returned text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptFailure {
    pub backend: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub text: String,
    /// Always the backend that produced `text`.
    pub backend_used: String,
    /// Failed tiers that were tried first, in order.
    pub attempts: Vec<AttemptFailure>,
}

/// Tries each tier in order and falls through to a terminal backend that
/// cannot fail, so `generate` always yields text.
pub struct BackendChain {
    tiers: Vec<Tier>,
    terminal: Box<dyn TerminalBackend>,
}

impl BackendChain {
    pub fn new(tiers: Vec<Tier>, terminal: Box<dyn TerminalBackend>) -> Self {
        Self { tiers, terminal }
    }

    /// Names in the order they are tried, terminal last.
    pub fn backend_names(&self) -> Vec<String> {
        self.tiers
            .iter()
            .map(|t| t.backend.name().to_string())
            .chain(std::iter::once(self.terminal.name().to_string()))
            .collect()
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let mut attempts = Vec::new();

        for tier in &self.tiers {
            let name = tier.backend.name();
            let started = Instant::now();

            let outcome = match tokio::time::timeout(tier.timeout, tier.backend.generate(request)).await
            {
                Ok(Ok(text)) if text.trim().is_empty() => Err(BackendFailure::Empty),
                Ok(result) => result,
                Err(_) => Err(BackendFailure::Timeout(tier.timeout)),
            };

            match outcome {
                Ok(text) => {
                    info!(
                        backend = %name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        failed_tiers = attempts.len(),
                        "generated text"
                    );
                    return GenerationResult {
                        text,
                        backend_used: name.to_string(),
                        attempts,
                    };
                }
                Err(failure) => {
                    warn!(backend = %name, reason = %failure, "generation tier failed, falling back");
                    attempts.push(AttemptFailure {
                        backend: name.to_string(),
                        reason: failure.to_string(),
                    });
                }
            }
        }

        if !self.tiers.is_empty() {
            error!(tiers = self.tiers.len(), "all generation tiers failed, using rule-based fallback");
        }

        let text = self.terminal.respond(request);
        if text.trim().is_empty() {
            error!(backend = %self.terminal.name(), "terminal backend returned no text");
            attempts.push(AttemptFailure {
                backend: self.terminal.name().to_string(),
                reason: BackendFailure::Empty.to_string(),
            });
            return GenerationResult {
                text: UNAVAILABLE_TEXT.to_string(),
                backend_used: UNAVAILABLE_BACKEND.to_string(),
                attempts,
            };
        }

        GenerationResult {
            text,
            backend_used: self.terminal.name().to_string(),
            attempts,
        }
    }

    /// Run independent requests concurrently; results keep request order.
    pub async fn generate_batch(&self, requests: &[GenerationRequest]) -> Vec<GenerationResult> {
        join_all(requests.iter().map(|r| self.generate(r))).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::mock::{MockBackend, MockTerminal};
    use crate::providers::rule_based::{RuleBasedBackend, RULE_BASED_NAME};

    fn request() -> GenerationRequest {
        GenerationRequest::new("Momentum Index (Score: 72/100)", "Write a tactical insight.")
    }

    fn tier(backend: MockBackend, secs: u64) -> Tier {
        Tier::new(Box::new(backend), Duration::from_secs(secs))
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_primary_falls_through_to_secondary() {
        let (hanging, partial) = MockBackend::hanging("primary", "Half a sentence about");
        let secondary = MockBackend::replying("secondary", "Track enemy jungler before contesting drake.");
        let secondary_calls = secondary.call_counter();

        let chain = BackendChain::new(
            vec![tier(hanging, 30), tier(secondary, 10)],
            Box::new(RuleBasedBackend),
        );
        let result = chain.generate(&request()).await;

        assert_eq!(result.backend_used, "secondary");
        assert_eq!(result.text, "Track enemy jungler before contesting drake.");
        assert!(!result.text.contains(partial.lock().unwrap().as_str()));
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.attempts[0].backend, "primary");
        assert!(result.attempts[0].reason.contains("timed out"));
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let second = MockBackend::replying("second", "unused");
        let second_calls = second.call_counter();
        let chain = BackendChain::new(
            vec![tier(MockBackend::replying("first", "Ward deeper."), 5), tier(second, 5)],
            Box::new(RuleBasedBackend),
        );
        let result = chain.generate(&request()).await;
        assert_eq!(result.backend_used, "first");
        assert!(result.attempts.is_empty());
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_and_failed_tiers_reach_the_terminal() {
        let chain = BackendChain::new(
            vec![
                tier(MockBackend::replying("blank", "   "), 5),
                tier(
                    MockBackend::failing("down", BackendFailure::Api { status: 503, body: "busy".into() }),
                    5,
                ),
            ],
            Box::new(RuleBasedBackend),
        );
        let result = chain.generate(&request()).await;
        assert_eq!(result.backend_used, RULE_BASED_NAME);
        assert_eq!(
            result.text,
            "Strong fundamentals with room to refine edge cases and high-pressure situations."
        );
        let reasons: Vec<&str> = result.attempts.iter().map(|a| a.reason.as_str()).collect();
        assert_eq!(reasons, vec!["empty response", "API error: 503: busy"]);
    }

    #[tokio::test]
    async fn terminal_only_chain() {
        let chain = BackendChain::new(Vec::new(), Box::new(RuleBasedBackend));
        assert_eq!(chain.backend_names(), vec![RULE_BASED_NAME.to_string()]);
        let result = chain.generate(&request()).await;
        assert_eq!(result.backend_used, RULE_BASED_NAME);
        assert!(!result.text.is_empty());
    }

    #[tokio::test]
    async fn silent_terminal_reports_unavailable() {
        let chain = BackendChain::new(Vec::new(), Box::new(MockTerminal::new("mute", "")));
        let result = chain.generate(&request()).await;
        assert_eq!(result.text, UNAVAILABLE_TEXT);
        assert_eq!(result.backend_used, UNAVAILABLE_BACKEND);
    }

    #[tokio::test(start_paused = true)]
    async fn batch_preserves_order() {
        let chain = BackendChain::new(
            vec![tier(MockBackend::echoing("echo"), 5)],
            Box::new(RuleBasedBackend),
        );
        let requests: Vec<GenerationRequest> = ["a", "b", "c"]
            .iter()
            .map(|q| GenerationRequest::new("", *q))
            .collect();
        let results = chain.generate_batch(&requests).await;
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}
