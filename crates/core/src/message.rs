//! The persisted conversation model.
//!
//! One row per message, either side of the conversation. Rows are immutable
//! after insert except for `delivery_status`, which status callbacks update
//! in place.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::Error;

/// Direction of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MessageRole {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(Error::invalid_input(format!(
                "unknown message role: {other}"
            ))),
        }
    }
}

/// A single message in a per-user conversation.
///
/// `timestamp` is epoch milliseconds from the relay clock, so both sides of
/// the conversation share one ordering axis; ties are broken by the row id
/// the store assigns on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMessage {
    /// Row id assigned by the store; 0 before persistence.
    pub id: i64,
    /// Stable external identifier of the conversing party.
    pub user_id: String,
    pub role: MessageRole,
    pub content: String,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// Platform-issued message id, set on assistant messages after a
    /// successful send. Join key for delivery-status reconciliation.
    pub external_message_id: Option<String>,
    /// Platform vocabulary string (sent/delivered/read/failed). Last write
    /// wins when callbacks arrive out of order.
    pub delivery_status: Option<String>,
}

impl ConversationMessage {
    #[must_use]
    pub fn user(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(user_id, MessageRole::User, content)
    }

    #[must_use]
    pub fn assistant(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(user_id, MessageRole::Assistant, content)
    }

    fn new(user_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: 0,
            user_id: user_id.into(),
            role,
            content: content.into(),
            timestamp: now_ms(),
            external_message_id: None,
            delivery_status: None,
        }
    }

    /// Tag the message with the platform-issued id from a send response.
    #[must_use]
    pub fn with_external_id(mut self, external_message_id: impl Into<String>) -> Self {
        self.external_message_id = Some(external_message_id.into());
        self
    }
}

/// Current time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
