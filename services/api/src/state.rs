//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared,
//! clonable resources passed to every handler.

use std::sync::Arc;
use study_router_core::Orchestrator;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}
