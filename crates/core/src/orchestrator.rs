//! Orchestrator
//!
//! Runs one conversational turn: classify the utterance, pick a responder,
//! invoke it and fold the outcome back into the session. All state changes of
//! a turn are applied in a single commit after the responder returns, so a
//! cancelled turn leaves the session exactly as it was.

use crate::{
    context::{ContextWindow, TurnContext},
    envelope::ResultEnvelope,
    error::OrchestratorError,
    intent::{Intent, IntentClassifier},
    prompts::PromptSet,
    responder::ResponderRegistry,
    state::{ConversationState, SessionHandle, SessionStore, Turn},
};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub window: ContextWindow,
    /// Returned when the intent is unclear and the session has none yet.
    pub clarifying_question: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            window: ContextWindow::default(),
            clarifying_question: PromptSet::default().clarifying_question,
        }
    }
}

pub struct Orchestrator {
    store: SessionStore,
    classifier: Arc<dyn IntentClassifier>,
    registry: ResponderRegistry,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        registry: ResponderRegistry,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            classifier,
            registry,
            config,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Handles one user message for `session_id`.
    ///
    /// Returns `Err` only for rejected input or a registry/classifier mismatch.
    /// Responder failures come back as a failed envelope and are still
    /// recorded in the session history.
    #[instrument(name = "turn", skip_all, fields(session_id = %session_id))]
    pub async fn handle_turn(
        &self,
        session_id: &str,
        user_query: &str,
    ) -> Result<ResultEnvelope, OrchestratorError> {
        if session_id.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "session_id must not be empty".to_string(),
            ));
        }
        if user_query.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }

        let (session, _turn_gate) = self.open_session(session_id).await;
        let snapshot = session.snapshot().await;
        let current_intent = snapshot.current_intent;

        let user_turn = Turn::user(user_query);
        let mut history = snapshot.turns;
        history.push(user_turn.clone());
        let prior = &history[..history.len() - 1];

        let classified = self
            .classifier
            .classify(user_query, self.config.window.recent(&history), current_intent)
            .await?;

        let intent = match (classified, current_intent) {
            (Intent::Unclear, None) => {
                info!("Intent unclear, asking for clarification");
                let question = &self.config.clarifying_question;
                session
                    .update(|s| s.commit_turn(user_turn, Turn::system(question.as_str()), None))
                    .await;
                return Ok(ResultEnvelope::clarification(question.as_str()));
            }
            (Intent::Unclear, Some(previous)) => previous,
            (intent, _) => intent,
        };

        let responder = self.registry.resolve(intent)?;
        info!(%intent, %classified, responder = %responder.id(), "Routing turn");

        let context = TurnContext::from_turns(self.config.window.recent(prior));
        let envelope = responder.respond(user_query, &context).await;

        let system_turn = match envelope.payload() {
            Some(payload) if envelope.is_success() => Turn::system(payload),
            _ => {
                warn!(errors = ?envelope.errors(), "Responder failed, recording failed turn");
                Turn::failure(envelope.errors())
            }
        };
        session
            .update(|s| s.commit_turn(user_turn, system_turn, Some((intent, &envelope))))
            .await;

        Ok(envelope)
    }

    /// A copy of the session's state, if the session exists.
    pub async fn snapshot(&self, session_id: &str) -> Option<ConversationState> {
        match self.store.get(session_id).await {
            Some(session) => Some(session.snapshot().await),
            None => None,
        }
    }

    /// Forgets a session. Returns `false` if it did not exist.
    ///
    /// Waits for the turn in flight to commit first. Turns queued behind the
    /// removal start a fresh session under the same id.
    pub async fn end_session(&self, session_id: &str) -> bool {
        let Some(session) = self.store.get(session_id).await else {
            return false;
        };
        let _turn_gate = session.begin_turn().await;
        let removed = self.store.remove_if_current(session_id, &session).await;
        if removed {
            info!(%session_id, "Session ended");
        }
        removed
    }

    /// Takes the turn gate of the live handle for `session_id`.
    ///
    /// A handle removed while this turn waited on its gate is discarded and
    /// the lookup starts over.
    async fn open_session(&self, session_id: &str) -> (Arc<SessionHandle>, OwnedMutexGuard<()>) {
        loop {
            let session = self.store.get_or_create(session_id).await;
            let gate = session.begin_turn().await;
            if self.store.is_current(session_id, &session).await {
                return (session, gate);
            }
            debug!("Session ended while waiting for its turn, reopening");
        }
    }
}
