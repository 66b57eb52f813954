//! Conversation State Store
//!
//! Holds per-session turn history, the last-known intent and the responder
//! results accumulated over a conversation. Each session lives behind its own
//! handle so turns for different sessions never contend with each other.

use crate::{envelope::ResultEnvelope, intent::Intent, responder::ResponderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    System,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::System => write!(f, "system"),
        }
    }
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set on system entries that record a failed responder invocation.
    #[serde(default)]
    pub failed: bool,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            failed: false,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
            timestamp: Utc::now(),
            failed: false,
        }
    }

    /// A system entry marking a failed turn, listing its errors.
    pub fn failure(errors: &[String]) -> Self {
        Self {
            failed: true,
            ..Self::system(format!("[turn failed] {}", errors.join("; ")))
        }
    }
}

/// Everything the router remembers about one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: String,
    pub turns: Vec<Turn>,
    /// `None` until a responder has answered successfully.
    pub current_intent: Option<Intent>,
    pub last_responder_id: Option<ResponderId>,
    /// Envelopes returned by responders, oldest first.
    pub results: Vec<ResultEnvelope>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            turns: Vec::new(),
            current_intent: None,
            last_responder_id: None,
            results: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a completed turn: the user entry and the system entry are
    /// appended together, and the intent is only recorded when `routed` names
    /// a responder that succeeded.
    pub fn commit_turn(
        &mut self,
        user_turn: Turn,
        system_turn: Turn,
        routed: Option<(Intent, &ResultEnvelope)>,
    ) {
        self.turns.push(user_turn);
        self.turns.push(system_turn);

        if let Some((intent, envelope)) = routed {
            if envelope.is_success() {
                self.current_intent = Some(intent);
                self.last_responder_id = envelope.selected_responder();
            }
            self.results.push(envelope.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// Per-session synchronization.
///
/// The turn gate is held for a whole turn so turns of one session run one at a
/// time. The state lock is only taken to snapshot or commit, never while a
/// responder is waiting on an external service.
#[derive(Debug)]
pub struct SessionHandle {
    turn_gate: Arc<Mutex<()>>,
    state: Mutex<ConversationState>,
}

impl SessionHandle {
    fn new(session_id: &str) -> Self {
        Self {
            turn_gate: Arc::new(Mutex::new(())),
            state: Mutex::new(ConversationState::new(session_id)),
        }
    }

    /// Waits until no other turn of this session is in flight.
    pub async fn begin_turn(&self) -> OwnedMutexGuard<()> {
        self.turn_gate.clone().lock_owned().await
    }

    pub async fn snapshot(&self) -> ConversationState {
        self.state.lock().await.clone()
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut ConversationState) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut state)
    }
}

/// In-memory registry of live sessions.
///
/// Expiry is the caller's policy; sessions stay until `remove_if_current` is called.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `session_id`, creating a fresh session if needed.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(SessionHandle::new(session_id)))
            .clone()
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    /// Whether `handle` is still the live handle registered for `session_id`.
    pub async fn is_current(&self, session_id: &str, handle: &Arc<SessionHandle>) -> bool {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .is_some_and(|live| Arc::ptr_eq(live, handle))
    }

    /// Drops `session_id` only if it still maps to `handle`.
    pub async fn remove_if_current(&self, session_id: &str, handle: &Arc<SessionHandle>) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(session_id) {
            Some(live) if Arc::ptr_eq(live, handle) => {
                sessions.remove(session_id);
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
