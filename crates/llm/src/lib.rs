pub mod chain;
pub mod prompt;
pub mod provider;
pub mod providers;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chain::{AttemptFailure, BackendChain, GenerationResult, Tier};
pub use provider::{
    BackendFailure, GenerationBackend, GenerationRequest, LlmError, Message, Role, TerminalBackend,
};
pub use providers::create_chain;
pub use providers::rule_based::RuleBasedBackend;
