use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{read_json, text_at, wire_messages};
use crate::prompt::chat_messages;
use crate::provider::{BackendFailure, GenerationBackend, GenerationRequest, Role};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct ClaudeBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    name: String,
}

impl ClaudeBackend {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            name: format!("anthropic:{model}"),
            model,
        }
    }
}

#[async_trait]
impl GenerationBackend for ClaudeBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendFailure> {
        // The system prompt is a top-level field here, not a message.
        let system = chat_messages(request)
            .into_iter()
            .find(|m| m.role == Role::System)
            .map(|m| m.content);

        let mut body = json!({
            "model": self.model,
            "messages": wire_messages(request, false),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }

        debug!(model = %self.model, "Claude request to {}", MESSAGES_URL);

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        text_at(&read_json(response).await?, "/content/0/text")
    }
}
