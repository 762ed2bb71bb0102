//! Wiring from configuration to a ready orchestrator.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use scope_analytics::source::file::JsonFileMatchSource;
use scope_analytics::source::http::HttpMatchSource;
use scope_analytics::{MatchSource, MetricExtractor, ProfileCache};
use scope_core::config::SourceConfig;
use scope_core::Config;
use scope_insight::Orchestrator;
use scope_llm::{Message, Role};

/// File-backed source when a path is given, the HTTP source otherwise.
pub fn match_source(matches: Option<&Path>, config: &SourceConfig) -> Result<Arc<dyn MatchSource>> {
    match matches {
        Some(path) => {
            info!(path = %path.display(), "reading matches from file");
            Ok(Arc::new(JsonFileMatchSource::new(path)))
        }
        None => {
            let source = HttpMatchSource::new(config)
                .context("no --matches file given and the HTTP match source is not usable")?;
            Ok(Arc::new(source))
        }
    }
}

pub fn build_orchestrator(config: &Config, source: Arc<dyn MatchSource>) -> Result<Orchestrator> {
    let chain = scope_llm::create_chain(&config.generation)
        .context("failed to build generation chain")?;
    let extractor = Arc::new(MetricExtractor::new(source, config.source.window));
    Ok(Orchestrator::new(
        extractor,
        ProfileCache::from_config(&config.cache),
        &config.analysis,
        chain,
    ))
}

/// Earlier turns from `history` (if any) followed by the new user message.
pub fn load_conversation(history: Option<&Path>, message: &str) -> Result<Vec<Message>> {
    let mut messages: Vec<Message> = match history {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read chat history: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid chat history: {}", path.display()))?
        }
        None => Vec::new(),
    };
    messages.push(Message::new(Role::User, message));
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_appends_the_new_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]"#,
        )
        .unwrap();

        let messages = load_conversation(Some(&path), "how do I climb?").unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2], Message::new(Role::User, "how do I climb?"));

        assert_eq!(load_conversation(None, "solo").unwrap().len(), 1);
    }

    #[test]
    fn malformed_history_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"role": "user"}"#).unwrap();
        let err = load_conversation(Some(&path), "x").unwrap_err();
        assert!(format!("{err:#}").contains("invalid chat history"));
    }

    #[test]
    fn http_source_needs_a_url() {
        let config = SourceConfig {
            url: None,
            status_url: None,
            timeout_secs: 15,
            retries: 2,
            backoff_ms: 250,
            window: 20,
        };
        assert!(match_source(None, &config).is_err());
        assert!(match_source(Some(Path::new("matches.json")), &config).is_ok());
    }
}
