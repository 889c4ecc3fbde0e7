//! Normalized inbound webhook event.
//!
//! Platform crates convert their raw webhook payloads into this shape up
//! front, so the orchestrator classifies typed fields instead of chasing
//! optional JSON paths. Malformed envelopes normalize to an empty event,
//! which the orchestrator ignores.

/// A delivery-status callback for a previously sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Platform-issued id of the message the status refers to.
    pub external_message_id: String,
    /// Platform vocabulary string (sent/delivered/read/failed).
    pub status: String,
}

/// Payload of a single inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessageKind {
    Text { body: String },
    /// Any non-text type (image, audio, location, ...). The relay answers
    /// these with a fixed notice instead of running the reply pipeline.
    Unsupported { message_type: String },
}

/// One inbound message, with whatever sender identity the payload carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Stable external id of the sender; `None` when the payload carried
    /// neither a contact id nor a from field.
    pub sender_id: Option<String>,
    /// Display name from the platform contact card.
    pub sender_name: Option<String>,
    /// Platform-issued id of the inbound message itself.
    pub external_id: Option<String>,
    pub kind: InboundMessageKind,
}

/// The normalized webhook event handed to the orchestrator.
///
/// Either list may be empty; an event with both empty is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    pub statuses: Vec<StatusUpdate>,
    pub messages: Vec<InboundMessage>,
}

impl InboundEvent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.messages.is_empty()
    }
}
