use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use scope_core::ConfigError;

/// A chat message, as exchanged with chat-style backends and callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One text-generation request: background context plus a directive query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub context: String,
    pub query: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(context: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            query: query.into(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A network text-completion tier. Implementations do not enforce their own
/// deadline; the chain wraps every call in the tier's timeout.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Reported as `backendUsed` when this backend produces the text.
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendFailure>;
}

/// The last tier: local, deterministic, and unable to fail.
pub trait TerminalBackend: Send + Sync {
    fn name(&self) -> &str;

    fn respond(&self, request: &GenerationRequest) -> String;
}

/// Why a single tier produced no usable text. Absorbed by the chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },
    #[error("empty response")]
    Empty,
    #[error("malformed response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for BackendFailure {
    fn from(err: reqwest::Error) -> Self {
        BackendFailure::Transport(err.to_string())
    }
}

/// Startup errors building the chain.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
