use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub source: SourceConfig,
    pub generation: GenerationConfig,
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SCOPE_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SCOPE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            source: SourceConfig::from_env_profiled(p),
            generation: GenerationConfig::from_env_profiled(p),
            cache: CacheConfig::from_env_profiled(p),
            analysis: AnalysisConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  source:      url={}, window={}",
            self.source.url.as_deref().unwrap_or("(none)"),
            self.source.window
        );
        tracing::info!(
            "  generation:  enabled={}, chain={}",
            self.generation.enabled,
            self.generation.chain
        );
        tracing::info!(
            "  cache:       ttl={}s, capacity={}",
            self.cache.ttl_secs,
            self.cache.capacity
        );
        tracing::info!("  analysis:    consistency_window={}", self.analysis.consistency_window);
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "source": {
                "url": self.source.url,
                "statusUrl": self.source.status_url,
                "timeoutSecs": self.source.timeout_secs,
                "retries": self.source.retries,
                "window": self.source.window,
            },
            "generation": {
                "enabled": self.generation.enabled,
                "chain": self.generation.chain,
                "relayConfigured": self.generation.relay_url.is_some(),
                "openaiConfigured": self.generation.openai_api_key.is_some(),
                "anthropicConfigured": self.generation.anthropic_api_key.is_some(),
                "ollama": { "url": self.generation.ollama_url, "model": self.generation.ollama_model },
            },
            "cache": { "ttlSecs": self.cache.ttl_secs, "capacity": self.cache.capacity },
            "analysis": { "consistencyWindow": self.analysis.consistency_window },
        })
    }
}

// ── Match source ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    /// Ingestion status endpoint; when unset the source is assumed ready.
    pub status_url: Option<String>,
    pub timeout_secs: u64,
    pub retries: u32,
    pub backoff_ms: u64,
    /// Number of most recent matches pulled per analysis (K).
    pub window: usize,
}

impl SourceConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_opt(p, "MATCH_SOURCE_URL"),
            status_url: profiled_env_opt(p, "MATCH_STATUS_URL"),
            timeout_secs: profiled_env_u64(p, "MATCH_SOURCE_TIMEOUT_SECS", 15),
            retries: profiled_env_u32(p, "MATCH_SOURCE_RETRIES", 2),
            backoff_ms: profiled_env_u64(p, "MATCH_SOURCE_BACKOFF_MS", 250),
            window: profiled_env_u32(p, "MATCH_WINDOW", 20) as usize,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

// ── Text generation ───────────────────────────────────────────

pub const DEFAULT_CHAIN: &str = "relay:DeepSeek-R1@30,relay:Amazon Nova Micro@10";

const DEFAULT_TIER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// When false, only the rule-based terminal backend is used.
    pub enabled: bool,
    /// Raw tier list, `kind[:model][@timeout_secs]`, comma separated.
    pub chain: String,
    pub relay_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl GenerationConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            enabled: profiled_env_bool(p, "GENERATION_ENABLED", true),
            chain: profiled_env_or(p, "GENERATION_CHAIN", DEFAULT_CHAIN),
            relay_url: profiled_env_opt(p, "RELAY_URL"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            ollama_url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            ollama_model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }

    /// Parse the configured tier list. Disabled generation yields no network tiers.
    pub fn tiers(&self) -> Result<Vec<TierSpec>, ConfigError> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        parse_chain(&self.chain)
    }
}

/// Network backend families that can sit in the generation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Relay,
    OpenAi,
    Anthropic,
    Ollama,
}

impl BackendKind {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "relay" => Ok(Self::Relay),
            "openai" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Relay => write!(f, "relay"),
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::Anthropic => write!(f, "anthropic"),
            BackendKind::Ollama => write!(f, "ollama"),
        }
    }
}

/// One network tier of the generation chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    pub kind: BackendKind,
    /// Model override; `None` means the backend's configured default.
    pub model: Option<String>,
    pub timeout: Duration,
}

/// Parse `kind[:model][@timeout_secs]` entries separated by commas.
pub fn parse_chain(raw: &str) -> Result<Vec<TierSpec>, ConfigError> {
    let mut tiers = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (head, timeout) = match entry.rsplit_once('@') {
            Some((head, secs)) => {
                let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::Invalid {
                    key: "GENERATION_CHAIN".into(),
                    value: entry.to_string(),
                    reason: "timeout must be whole seconds".into(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        key: "GENERATION_CHAIN".into(),
                        value: entry.to_string(),
                        reason: "timeout must be positive".into(),
                    });
                }
                (head, Duration::from_secs(secs))
            }
            None => (entry, Duration::from_secs(DEFAULT_TIER_TIMEOUT_SECS)),
        };

        let (kind, model) = match head.split_once(':') {
            Some((kind, model)) => {
                let model = model.trim();
                (kind, (!model.is_empty()).then(|| model.to_string()))
            }
            None => (head, None),
        };

        tiers.push(TierSpec {
            kind: BackendKind::parse(kind)?,
            model,
            timeout,
        });
    }
    Ok(tiers)
}

// ── Profile cache ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// Maximum number of cached profiles (N).
    pub capacity: usize,
}

impl CacheConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            ttl_secs: profiled_env_u64(p, "PROFILE_CACHE_TTL_SECS", 300),
            capacity: profiled_env_u32(p, "PROFILE_CACHE_CAPACITY", 50) as usize,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

// ── Analysis ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Trailing window (W) for rolling consistency.
    pub consistency_window: usize,
}

impl AnalysisConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            consistency_window: profiled_env_u32(p, "CONSISTENCY_WINDOW", 5).max(2) as usize,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { consistency_window: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_parses_into_two_relay_tiers() {
        let tiers = parse_chain(DEFAULT_CHAIN).unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].kind, BackendKind::Relay);
        assert_eq!(tiers[0].model.as_deref(), Some("DeepSeek-R1"));
        assert_eq!(tiers[0].timeout, Duration::from_secs(30));
        assert_eq!(tiers[1].model.as_deref(), Some("Amazon Nova Micro"));
        assert_eq!(tiers[1].timeout, Duration::from_secs(10));
    }

    #[test]
    fn tier_without_model_or_timeout_uses_defaults() {
        let tiers = parse_chain("ollama").unwrap();
        assert_eq!(tiers[0].kind, BackendKind::Ollama);
        assert!(tiers[0].model.is_none());
        assert_eq!(tiers[0].timeout, Duration::from_secs(DEFAULT_TIER_TIMEOUT_SECS));
    }

    #[test]
    fn empty_chain_is_allowed() {
        assert!(parse_chain("").unwrap().is_empty());
        assert!(parse_chain(" , ").unwrap().is_empty());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = parse_chain("bedrock:nova@5").unwrap_err();
        assert_eq!(err, ConfigError::UnknownBackend("bedrock".into()));
    }

    #[test]
    fn bad_timeouts_are_rejected() {
        assert!(matches!(
            parse_chain("openai@soon"),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            parse_chain("openai@0"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn disabled_generation_has_no_network_tiers() {
        let mut config = Config::for_profile("CFGTEST_DISABLED");
        config.generation.enabled = false;
        config.generation.chain = "nonsense-kind".into();
        assert!(config.generation.tiers().unwrap().is_empty());
    }

    #[test]
    fn profiled_keys_take_precedence() {
        env::set_var("CFGTEST_PROFILED_MATCH_WINDOW", "7");
        let config = Config::for_profile("cfgtest_profiled");
        assert_eq!(config.profile, "CFGTEST_PROFILED");
        assert_eq!(config.source.window, 7);
        env::remove_var("CFGTEST_PROFILED_MATCH_WINDOW");
    }

    #[test]
    fn redacted_summary_has_no_secrets() {
        let mut config = Config::for_profile("CFGTEST_REDACT");
        config.generation.openai_api_key = Some("sk-secret".into());
        let summary = config.redacted_summary().to_string();
        assert!(!summary.contains("sk-secret"));
        assert!(summary.contains("\"openaiConfigured\":true"));
    }
}
