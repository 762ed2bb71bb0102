use thiserror::Error;

/// Startup-time configuration problems. These are fatal, never per-request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),

    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown generation backend kind '{0}'")]
    UnknownBackend(String),
}
