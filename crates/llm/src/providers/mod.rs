pub mod claude;
pub mod ollama;
pub mod openai;
pub mod relay;
pub mod rule_based;

use serde_json::{json, Value};
use tracing::info;

use scope_core::config::{BackendKind, GenerationConfig, TierSpec};
use scope_core::ConfigError;

use crate::chain::{BackendChain, Tier};
use crate::prompt::chat_messages;
use crate::provider::{BackendFailure, GenerationBackend, GenerationRequest, LlmError, Role};

const DEFAULT_RELAY_MODEL: &str = "DeepSeek-R1";

fn missing(key: &str) -> LlmError {
    LlmError::Config(ConfigError::Missing(key.to_string()))
}

/// Decode a backend response. Anything but 200 is an API failure.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, BackendFailure> {
    let status = response.status().as_u16();
    if status != 200 {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendFailure::Api { status, body });
    }
    response
        .json()
        .await
        .map_err(|e| BackendFailure::Parse(e.to_string()))
}

/// Required string at a JSON pointer such as `/choices/0/message/content`.
pub(crate) fn text_at(resp: &Value, pointer: &str) -> Result<String, BackendFailure> {
    resp.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BackendFailure::Parse(format!("missing {pointer}")))
}

/// `{role, content}` objects for chat-style APIs. Without `with_system` the
/// system message is left out, for APIs that take it separately.
pub(crate) fn wire_messages(request: &GenerationRequest, with_system: bool) -> Vec<Value> {
    chat_messages(request)
        .iter()
        .filter(|m| with_system || m.role != Role::System)
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect()
}

/// Build one network backend for a configured tier.
pub fn create_backend(
    spec: &TierSpec,
    config: &GenerationConfig,
    client: &reqwest::Client,
) -> Result<Box<dyn GenerationBackend>, LlmError> {
    let model = |default: &str| spec.model.clone().unwrap_or_else(|| default.to_string());

    match spec.kind {
        BackendKind::Relay => {
            let url = config
                .relay_url
                .as_ref()
                .ok_or_else(|| missing("RELAY_URL"))?;
            Ok(Box::new(relay::RelayBackend::new(
                client.clone(),
                url.clone(),
                model(DEFAULT_RELAY_MODEL),
            )))
        }
        BackendKind::OpenAi => {
            let api_key = config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| missing("OPENAI_API_KEY"))?;
            let base_url = config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiBackend::new(
                client.clone(),
                api_key.clone(),
                model(&config.openai_model),
                base_url.to_string(),
            )))
        }
        BackendKind::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| missing("ANTHROPIC_API_KEY"))?;
            Ok(Box::new(claude::ClaudeBackend::new(
                client.clone(),
                api_key.clone(),
                model(&config.anthropic_model),
            )))
        }
        BackendKind::Ollama => Ok(Box::new(ollama::OllamaBackend::new(
            client.clone(),
            config.ollama_url.clone(),
            model(&config.ollama_model),
        ))),
    }
}

/// Build the configured chain, ending in the rule-based backend.
///
/// Any tier whose endpoint or credential is missing fails here, at startup.
pub fn create_chain(config: &GenerationConfig) -> Result<BackendChain, LlmError> {
    let specs = config.tiers()?;
    let client = reqwest::Client::builder().build()?;

    let tiers = specs
        .iter()
        .map(|spec| -> Result<Tier, LlmError> {
            Ok(Tier::new(create_backend(spec, config, &client)?, spec.timeout))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let chain = BackendChain::new(tiers, Box::new(rule_based::RuleBasedBackend));
    info!(
        enabled = config.enabled,
        backends = ?chain.backend_names(),
        "generation chain ready"
    );
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_core::config::DEFAULT_CHAIN;

    fn config(chain: &str) -> GenerationConfig {
        GenerationConfig {
            enabled: true,
            chain: chain.to_string(),
            relay_url: Some("http://relay.local".into()),
            openai_api_key: None,
            openai_model: "gpt-4o-mini".into(),
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_model: "claude-sonnet-4-5-20250929".into(),
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "llama3.2".into(),
        }
    }

    #[test]
    fn pointer_text_extraction() {
        let resp = json!({"choices": [{"message": {"content": "Push bot."}}]});
        assert_eq!(text_at(&resp, "/choices/0/message/content").unwrap(), "Push bot.");
        assert_eq!(
            text_at(&resp, "/content/0/text"),
            Err(BackendFailure::Parse("missing /content/0/text".into()))
        );
    }

    #[test]
    fn system_message_is_optional_on_the_wire() {
        let req = GenerationRequest::new("ctx", "q");
        let with = wire_messages(&req, true);
        let without = wire_messages(&req, false);
        assert_eq!(with.len(), 2);
        assert_eq!(with[0]["role"], "system");
        assert_eq!(without.len(), 1);
        assert_eq!(without[0]["role"], "user");
    }

    #[test]
    fn default_chain_order() {
        let chain = create_chain(&config(DEFAULT_CHAIN)).unwrap();
        assert_eq!(
            chain.backend_names(),
            vec!["DeepSeek-R1", "Amazon Nova Micro", "Rule-based"]
        );
    }

    #[test]
    fn missing_endpoint_is_a_startup_error() {
        let mut cfg = config(DEFAULT_CHAIN);
        cfg.relay_url = None;
        assert!(matches!(
            create_chain(&cfg),
            Err(LlmError::Config(ConfigError::Missing(key))) if key == "RELAY_URL"
        ));

        let cfg = config("openai");
        assert!(matches!(
            create_chain(&cfg),
            Err(LlmError::Config(ConfigError::Missing(key))) if key == "OPENAI_API_KEY"
        ));
    }

    #[test]
    fn malformed_chain_is_a_config_error() {
        assert!(matches!(create_chain(&config("gemini")), Err(LlmError::Config(_))));
        assert!(matches!(create_chain(&config("relay@0")), Err(LlmError::Config(_))));
    }

    #[test]
    fn disabled_generation_keeps_only_the_terminal() {
        let mut cfg = config(DEFAULT_CHAIN);
        cfg.enabled = false;
        cfg.relay_url = None;
        let chain = create_chain(&cfg).unwrap();
        assert_eq!(chain.backend_names(), vec!["Rule-based"]);
    }

    #[test]
    fn mixed_chain_uses_model_overrides() {
        let mut cfg = config("ollama@5, openai:gpt-4.1@8");
        cfg.openai_api_key = Some("sk-test".into());
        let chain = create_chain(&cfg).unwrap();
        assert_eq!(
            chain.backend_names(),
            vec!["ollama:llama3.2", "openai:gpt-4.1", "Rule-based"]
        );
    }
}
