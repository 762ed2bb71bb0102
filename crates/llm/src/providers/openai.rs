use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{read_json, text_at, wire_messages};
use crate::provider::{BackendFailure, GenerationBackend, GenerationRequest};

/// OpenAI-compatible chat completions.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    name: String,
}

impl OpenAiBackend {
    pub fn new(client: reqwest::Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            name: format!("openai:{model}"),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendFailure> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": wire_messages(request, true),
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(model = %self.model, "OpenAI request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        text_at(&read_json(response).await?, "/choices/0/message/content")
    }
}
