use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{read_json, text_at, wire_messages};
use crate::provider::{BackendFailure, GenerationBackend, GenerationRequest};

/// Local Ollama chat endpoint, non-streaming.
pub struct OllamaBackend {
    client: reqwest::Client,
    url: String,
    model: String,
    name: String,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, url: String, model: String) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            name: format!("ollama:{model}"),
            model,
        }
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendFailure> {
        let url = format!("{}/api/chat", self.url);
        let body = json!({
            "model": self.model,
            "messages": wire_messages(request, true),
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        });

        debug!(model = %self.model, "Ollama request to {}", url);

        let response = self.client.post(&url).json(&body).send().await?;
        text_at(&read_json(response).await?, "/message/content")
    }
}
