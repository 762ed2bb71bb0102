//! Scripted backends for tests in this and downstream crates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::provider::{BackendFailure, GenerationBackend, GenerationRequest, TerminalBackend};

enum Behavior {
    Reply(String),
    Fail(BackendFailure),
    /// Writes partial output to a shared buffer, then never completes.
    Hang {
        partial: String,
        sink: Arc<Mutex<String>>,
    },
    /// Replies with the request's query.
    Echo,
    /// Replies with the request's context.
    EchoContext,
}

pub struct MockBackend {
    name: String,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    fn with(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn replying(name: &str, text: &str) -> Self {
        Self::with(name, Behavior::Reply(text.to_string()))
    }

    pub fn failing(name: &str, failure: BackendFailure) -> Self {
        Self::with(name, Behavior::Fail(failure))
    }

    pub fn echoing(name: &str) -> Self {
        Self::with(name, Behavior::Echo)
    }

    pub fn echoing_context(name: &str) -> Self {
        Self::with(name, Behavior::EchoContext)
    }

    /// A backend that stalls forever; the returned buffer holds what it
    /// "streamed" before stalling.
    pub fn hanging(name: &str, partial: &str) -> (Self, Arc<Mutex<String>>) {
        let sink = Arc::new(Mutex::new(String::new()));
        let backend = Self::with(
            name,
            Behavior::Hang {
                partial: partial.to_string(),
                sink: sink.clone(),
            },
        );
        (backend, sink)
    }

    /// Shared invocation counter, usable after the backend moves into a chain.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(failure) => Err(failure.clone()),
            Behavior::Echo => Ok(request.query.clone()),
            Behavior::EchoContext => Ok(request.context.clone()),
            Behavior::Hang { partial, sink } => {
                sink.lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .push_str(partial);
                std::future::pending::<()>().await;
                Err(BackendFailure::Empty)
            }
        }
    }
}

/// Terminal backend with a fixed answer, including an empty one.
pub struct MockTerminal {
    name: String,
    text: String,
}

impl MockTerminal {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
        }
    }
}

impl TerminalBackend for MockTerminal {
    fn name(&self) -> &str {
        &self.name
    }

    fn respond(&self, _request: &GenerationRequest) -> String {
        self.text.clone()
    }
}
