//! Conversation orchestration.
//!
//! The orchestrator owns the inbound event lifecycle: classify the event,
//! reconcile delivery statuses, and run the text reply pipeline against the
//! injected history store, reply generator and delivery sender.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, Outcome, UNSUPPORTED_TYPE_REPLY};
