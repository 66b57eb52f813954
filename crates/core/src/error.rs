//! Error types for the routing core.
//!
//! Only `OrchestratorError` ever leaves `Orchestrator::handle_turn`. The other
//! types are boundary errors that responders and the classifier convert into
//! failed envelopes or degraded behaviour.

use crate::intent::Intent;

/// Fatal errors surfaced to the caller of `handle_turn`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// The caller sent malformed input. Rejected before any state is touched.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The registry was asked for an intent that has no responder.
    #[error("No responder is registered for intent '{0}'")]
    UnknownIntent(Intent),
}

/// Failures reported by a text-generation backend.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("Text generation failed: {0}")]
    Transient(String),
    #[error("Text generation returned no content")]
    EmptyOutput,
    #[error("Text generation returned a malformed response: {0}")]
    Malformed(String),
}

/// Failures inside a single responder invocation.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Responder did not converge within {limit}")]
    Timeout { limit: String },
}

/// Failures from the external retrieval tool.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Search request failed: {0}")]
    Http(String),
    #[error("Search response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
