//! Responders
//!
//! A responder turns a query plus conversation context into a
//! `ResultEnvelope`. The set of strategies is closed (`ResponderId`), but each
//! strategy sits behind the same `Responder` trait so the registry and the
//! orchestrator never care which one they hold.

mod exam;
mod registry;
mod simple;

pub use exam::{ExamDetailedResponder, SEARCH_TOOL_NAME};
pub use registry::ResponderRegistry;
pub use simple::SimpleExplainResponder;

use crate::{context::TurnContext, envelope::ResultEnvelope};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one of the available response strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponderId {
    SimpleExplain,
    ExamDetailed,
}

impl fmt::Display for ResponderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponderId::SimpleExplain => write!(f, "simple-explain"),
            ResponderId::ExamDetailed => write!(f, "exam-detailed"),
        }
    }
}

/// A response-generation strategy.
///
/// Implementations must never panic or return early with an error: every
/// failure is reported as a failed envelope.
#[async_trait]
pub trait Responder: Send + Sync {
    fn id(&self) -> ResponderId;

    async fn respond(&self, query: &str, context: &TurnContext) -> ResultEnvelope;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responder_id_display_matches_serde() {
        for id in [ResponderId::SimpleExplain, ResponderId::ExamDetailed] {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id));
        }
    }
}
