use std::sync::Arc;

use tracing::{info, warn};

use parlo_core::{
    ConversationMessage, DEFAULT_HISTORY_LIMIT, DeliverySender, HistoryStore, InboundEvent,
    InboundMessageKind, ReplyGenerator,
};

/// Notice sent back for message types the relay cannot handle.
pub const UNSUPPORTED_TYPE_REPLY: &str =
    "I currently only support text messages. Please send a text message!";

/// Terminal outcome of one webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Status callbacks were reconciled; no reply was owed.
    Acknowledged,
    /// A reply was generated and delivered.
    RepliedSuccessfully,
    /// A reply was owed but delivery failed.
    RepliedFailed,
    /// Nothing actionable in the event.
    Ignored,
}

/// Drives one inbound event end to end.
///
/// Collaborators are injected once at construction; the orchestrator itself
/// is stateless and can process events from many users concurrently.
pub struct Orchestrator {
    history: Arc<dyn HistoryStore>,
    generator: Arc<dyn ReplyGenerator>,
    sender: Arc<dyn DeliverySender>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        history: Arc<dyn HistoryStore>,
        generator: Arc<dyn ReplyGenerator>,
        sender: Arc<dyn DeliverySender>,
    ) -> Self {
        Self {
            history,
            generator,
            sender,
        }
    }

    /// Classify and process one normalized webhook event.
    ///
    /// Status callbacks win over messages when both are present; among
    /// messages only the first is processed, matching the one-notification-
    /// per-call shape the platform delivers.
    pub async fn handle_event(&self, event: InboundEvent) -> Outcome {
        if !event.statuses.is_empty() {
            for status in &event.statuses {
                self.apply_status(&status.external_message_id, &status.status)
                    .await;
            }
            return Outcome::Acknowledged;
        }

        let mut messages = event.messages.into_iter();
        let Some(first) = messages.next() else {
            return Outcome::Ignored;
        };
        let dropped = messages.len();
        if dropped > 0 {
            warn!(dropped, "webhook carried multiple messages, processing first only");
        }

        match &first.kind {
            InboundMessageKind::Unsupported { message_type } => {
                let Some(user_id) = first.sender_id.as_deref() else {
                    return Outcome::Ignored;
                };
                info!(
                    user_id,
                    message_type = %message_type,
                    "unsupported message type, sending notice"
                );
                let receipt = self.sender.send_text(user_id, UNSUPPORTED_TYPE_REPLY).await;
                if receipt.success {
                    Outcome::RepliedSuccessfully
                } else {
                    Outcome::RepliedFailed
                }
            },
            InboundMessageKind::Text { body } => {
                let Some(user_id) = first.sender_id.as_deref() else {
                    return Outcome::Ignored;
                };
                if body.is_empty() {
                    return Outcome::Ignored;
                }
                self.run_text_pipeline(user_id, first.sender_name.as_deref(), body)
                    .await
            },
        }
    }

    async fn run_text_pipeline(
        &self,
        user_id: &str,
        sender_name: Option<&str>,
        content: &str,
    ) -> Outcome {
        info!(
            user_id,
            sender = sender_name.unwrap_or("unknown"),
            "incoming message: {}",
            content,
        );

        // History is loaded before the inbound message is written so the
        // generator only sees turns strictly prior to it.
        let history = match self
            .history
            .list_by_user(user_id, DEFAULT_HISTORY_LIMIT)
            .await
        {
            Ok(history) => history,
            Err(err) => {
                warn!(user_id, error = %err, "history load failed, continuing without context");
                Vec::new()
            },
        };

        if let Err(err) = self
            .history
            .append(ConversationMessage::user(user_id, content))
            .await
        {
            warn!(user_id, error = %err, "failed to persist inbound message");
        }

        let reply = self.generator.generate(content, &history).await;
        let receipt = self.sender.send_text(user_id, &reply).await;
        if !receipt.success {
            return Outcome::RepliedFailed;
        }

        let mut assistant = ConversationMessage::assistant(user_id, &reply);
        if let Some(external_id) = receipt.external_message_id {
            assistant = assistant.with_external_id(external_id);
        }
        if let Err(err) = self.history.append(assistant).await {
            // The user already has the reply; only the record is lost.
            warn!(user_id, error = %err, "reply sent but not persisted");
        }

        Outcome::RepliedSuccessfully
    }

    async fn apply_status(&self, external_message_id: &str, status: &str) {
        match self
            .history
            .update_status_by_external_id(external_message_id, status)
            .await
        {
            Ok(Some(_)) => {
                info!(external_message_id, status, "delivery status updated");
            },
            Ok(None) => {
                warn!(external_message_id, status, "status callback for unknown message");
            },
            Err(err) => {
                warn!(external_message_id, error = %err, "failed to apply status update");
            },
        }
    }
}
