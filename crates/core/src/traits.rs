//! Collaborator contracts the orchestrator drives.

use async_trait::async_trait;

use crate::{Result, message::ConversationMessage};

/// How many history entries the reply pipeline loads per user.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Ordered per-user persistence for conversation messages.
///
/// The store is passive: it assigns row identity on insert and never touches
/// ordering fields the caller supplied.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one message and return it with its assigned row id.
    async fn append(&self, message: ConversationMessage) -> Result<ConversationMessage>;

    /// Persist a batch of messages in one transaction.
    async fn append_many(&self, messages: Vec<ConversationMessage>) -> Result<()>;

    /// The most recent `limit` messages for a user, returned oldest-first.
    async fn list_by_user(&self, user_id: &str, limit: u32) -> Result<Vec<ConversationMessage>>;

    /// Update the delivery status of the message carrying this platform id.
    /// Returns `None` when no message matches.
    async fn update_status_by_external_id(
        &self,
        external_message_id: &str,
        status: &str,
    ) -> Result<Option<ConversationMessage>>;

    /// The most recent user-authored message for a user, if any.
    async fn last_user_message(&self, user_id: &str) -> Result<Option<ConversationMessage>>;
}

/// Stateless wrapper around the conversational-AI call.
///
/// `generate` never fails: provider faults map to a fixed fallback string so
/// the pipeline always has something to send. History arrives oldest-first
/// and never includes the message being answered.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, message: &str, history: &[ConversationMessage]) -> String;
}

/// Result of an outbound send attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReceipt {
    pub success: bool,
    /// Platform-issued message id, present on success when the platform
    /// returned one. Correlates later delivery-status callbacks.
    pub external_message_id: Option<String>,
}

impl SendReceipt {
    #[must_use]
    pub fn failure() -> Self {
        Self::default()
    }
}

/// Stateless wrapper around the outbound send API.
///
/// Never fails: transport and platform errors are captured and reported as
/// `success: false`. Implementations enforce the platform's maximum body
/// length by truncation before transmission.
#[async_trait]
pub trait DeliverySender: Send + Sync {
    async fn send_text(&self, user_id: &str, text: &str) -> SendReceipt;
}
