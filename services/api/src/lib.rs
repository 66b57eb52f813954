//! Study Router API Library Crate
//!
//! This library contains everything the web service needs around the core
//! orchestrator: configuration, service wiring, API handlers and routing.
//! The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
