//! The normalized result returned for every executed turn.

use crate::responder::ResponderId;
use serde::{Deserialize, Serialize};

/// Fallback description for a failure built without any error text.
const UNSPECIFIED_FAILURE: &str = "The responder failed without an error description.";

/// Success/failure wrapper returned by every responder and by the orchestrator.
///
/// Fields are private so the pairing rules always hold: a failed envelope has
/// no payload and at least one error, a successful one has no errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    success: bool,
    payload: Option<String>,
    errors: Vec<String>,
    selected_responder: Option<ResponderId>,
}

impl ResultEnvelope {
    /// A successful answer produced by `responder`.
    pub fn success(responder: ResponderId, payload: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: Some(payload.into()),
            errors: Vec::new(),
            selected_responder: Some(responder),
        }
    }

    /// A clarifying question asked instead of routing to a responder.
    pub fn clarification(question: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: Some(question.into()),
            errors: Vec::new(),
            selected_responder: None,
        }
    }

    /// A failed invocation of `responder`.
    pub fn failure<I, S>(responder: ResponderId, errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut errors: Vec<String> = errors.into_iter().map(Into::into).collect();
        if errors.is_empty() {
            errors.push(UNSPECIFIED_FAILURE.to_string());
        }
        Self {
            success: false,
            payload: None,
            errors,
            selected_responder: Some(responder),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The responder that produced this result, or `None` for a clarification.
    pub fn selected_responder(&self) -> Option<ResponderId> {
        self.selected_responder
    }

    pub fn is_clarification(&self) -> bool {
        self.success && self.selected_responder.is_none()
    }
}
