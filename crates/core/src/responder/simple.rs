use super::{Responder, ResponderId};
use crate::{
    context::TurnContext,
    envelope::ResultEnvelope,
    error::LlmError,
    llm_client::{ChatMessage, LLMClient},
    prompts,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Beginner-friendly explanations from a single text-generation call.
pub struct SimpleExplainResponder {
    llm: Arc<dyn LLMClient>,
    template: String,
}

impl SimpleExplainResponder {
    pub fn new(llm: Arc<dyn LLMClient>, template: String) -> Self {
        Self { llm, template }
    }
}

#[async_trait]
impl Responder for SimpleExplainResponder {
    fn id(&self) -> ResponderId {
        ResponderId::SimpleExplain
    }

    async fn respond(&self, query: &str, context: &TurnContext) -> ResultEnvelope {
        let system = prompts::render(&self.template, &context.transcript);
        let messages = [ChatMessage::User(query.to_string())];

        let outcome = match self.llm.generate(&system, &messages).await {
            Ok(text) if text.trim().is_empty() => Err(LlmError::EmptyOutput),
            other => other,
        };
        match outcome {
            Ok(text) => {
                info!(chars = text.len(), "Simple explanation generated");
                ResultEnvelope::success(self.id(), text)
            }
            Err(e) => {
                error!(error = %e, "Simple explanation failed");
                ResultEnvelope::failure(self.id(), [e.to_string()])
            }
        }
    }
}
