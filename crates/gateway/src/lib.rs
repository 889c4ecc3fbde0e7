//! HTTP surface of the relay.
//!
//! Wires the webhook endpoints to the orchestrator: subscription
//! verification on GET, immediate acknowledgment plus a spawned pipeline on
//! POST, and a thin passthrough for operator-initiated sends.

pub mod config;
pub mod server;
pub mod state;

pub use {
    config::RelayConfig,
    server::{build_app, start_server},
    state::AppState,
};
