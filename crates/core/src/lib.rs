//! Shared types and collaborator contracts for the parlo relay.
//!
//! The conversation model, the normalized inbound event, and the traits the
//! orchestrator drives (history store, reply generator, delivery sender) all
//! live here so platform and provider crates can be swapped independently.

pub mod error;
pub mod event;
pub mod message;
pub mod traits;

pub use {
    error::{Error, Result},
    event::{InboundEvent, InboundMessage, InboundMessageKind, StatusUpdate},
    message::{ConversationMessage, MessageRole, now_ms},
    traits::{DEFAULT_HISTORY_LIMIT, DeliverySender, HistoryStore, ReplyGenerator, SendReceipt},
};
