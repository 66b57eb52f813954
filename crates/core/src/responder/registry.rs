use super::{Responder, ResponderId};
use crate::{error::OrchestratorError, intent::Intent};
use std::sync::Arc;

/// Maps each selectable intent to the responder that serves it.
///
/// Built once at startup; there is no way to change it afterwards.
pub struct ResponderRegistry {
    simple: Arc<dyn Responder>,
    exam: Arc<dyn Responder>,
}

impl ResponderRegistry {
    pub fn new(simple: Arc<dyn Responder>, exam: Arc<dyn Responder>) -> Self {
        Self { simple, exam }
    }

    /// The responder for `intent`. `Unclear` has none and is an invariant
    /// violation on the caller's side.
    pub fn resolve(&self, intent: Intent) -> Result<Arc<dyn Responder>, OrchestratorError> {
        match intent {
            Intent::Simple => Ok(self.simple.clone()),
            Intent::Exam => Ok(self.exam.clone()),
            Intent::Unclear => Err(OrchestratorError::UnknownIntent(intent)),
        }
    }

    pub fn responder_ids(&self) -> [ResponderId; 2] {
        [self.simple.id(), self.exam.id()]
    }
}
