//! Study Router Core
//!
//! Routes a student's study request to the responder that matches the
//! learning style they asked for, keeps per-session conversation state and
//! returns every turn's outcome as a `ResultEnvelope`.

pub mod context;
pub mod envelope;
pub mod error;
pub mod intent;
pub mod llm_client;
pub mod orchestrator;
pub mod prompts;
pub mod responder;
pub mod retrieval;
pub mod state;

pub use envelope::ResultEnvelope;
pub use error::OrchestratorError;
pub use intent::Intent;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use responder::ResponderId;
