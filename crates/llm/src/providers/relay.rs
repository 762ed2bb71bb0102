use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::read_json;
use crate::prompt::render_prompt;
use crate::provider::{BackendFailure, GenerationBackend, GenerationRequest};

/// Completion relay: one endpoint fronting several hosted models.
///
/// Request body is `{prompt, model, temperature, maxTokens}`; the answer
/// comes back as `{"reply": "..."}`. Each tier pins one model and is named
/// after it.
pub struct RelayBackend {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl RelayBackend {
    pub fn new(client: reqwest::Client, url: String, model: String) -> Self {
        Self { client, url, model }
    }
}

/// Pull the reply text out of a relay response body.
pub(crate) fn parse_reply(resp: &serde_json::Value) -> Result<String, BackendFailure> {
    match resp.get("reply") {
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => {
            Err(BackendFailure::Empty)
        }
        Some(other) => Err(BackendFailure::Parse(format!("reply is not a string: {other}"))),
    }
}

#[async_trait]
impl GenerationBackend for RelayBackend {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendFailure> {
        let body = json!({
            "prompt": render_prompt(request),
            "model": self.model,
            "temperature": request.temperature,
            "maxTokens": request.max_tokens,
        });

        debug!(model = %self.model, "relay request to {}", self.url);

        let response = self.client.post(&self.url).json(&body).send().await?;
        let resp = read_json(response).await?;
        parse_reply(&resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_parsing() {
        assert_eq!(parse_reply(&json!({"reply": "Ward the river."})).unwrap(), "Ward the river.");
        assert_eq!(parse_reply(&json!({"reply": "  "})), Err(BackendFailure::Empty));
        assert_eq!(parse_reply(&json!({})), Err(BackendFailure::Empty));
        assert!(matches!(
            parse_reply(&json!({"reply": 3})),
            Err(BackendFailure::Parse(_))
        ));
    }

    #[test]
    fn named_after_model() {
        let backend = RelayBackend::new(
            reqwest::Client::new(),
            "http://relay.local".into(),
            "Amazon Nova Micro".into(),
        );
        assert_eq!(backend.name(), "Amazon Nova Micro");
    }
}
