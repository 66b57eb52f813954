//! API Models
//!
//! Request and response bodies of the REST API, with `utoipa` schemas for the
//! generated OpenAPI document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use study_router_core::{
    ResultEnvelope,
    state::{ConversationState, Turn},
};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct TurnRequest {
    #[schema(example = "I need this for my university exam, 16 marks")]
    pub query: String,
}

/// The outcome of one turn.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct TurnResponse {
    pub success: bool,
    pub payload: Option<String>,
    pub errors: Vec<String>,
    /// `simple-explain`, `exam-detailed`, or null for a clarifying question.
    #[schema(example = "exam-detailed")]
    pub selected_responder: Option<String>,
}

impl From<&ResultEnvelope> for TurnResponse {
    fn from(envelope: &ResultEnvelope) -> Self {
        Self {
            success: envelope.is_success(),
            payload: envelope.payload().map(str::to_string),
            errors: envelope.errors().to_vec(),
            selected_responder: envelope.selected_responder().map(|id| id.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct TurnView {
    #[schema(example = "user")]
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub failed: bool,
}

impl From<Turn> for TurnView {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content,
            timestamp: turn.timestamp,
            failed: turn.failed,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionView {
    pub session_id: String,
    #[schema(example = "exam")]
    pub current_intent: Option<String>,
    #[schema(example = "exam-detailed")]
    pub last_responder: Option<String>,
    pub turns: Vec<TurnView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ConversationState> for SessionView {
    fn from(state: ConversationState) -> Self {
        Self {
            session_id: state.session_id,
            current_intent: state.current_intent.map(|i| i.to_string()),
            last_responder: state.last_responder_id.map(|id| id.to_string()),
            turns: state.turns.into_iter().map(TurnView::from).collect(),
            created_at: state.created_at,
            updated_at: state.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
