//! Webhook payload types for the WhatsApp Cloud API.
//!
//! Every field is defaulted so that unexpected or partial payloads decode to
//! empty values instead of failing the request.

use serde::Deserialize;

/// Top-level webhook notification body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookPayload {
    pub object: String,
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookEntry {
    pub id: String,
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebhookChange {
    pub field: String,
    pub value: Option<ChangeValue>,
}

/// The notification body carried by a `messages` change.
///
/// Exactly one of `messages` or `statuses` is populated in practice, but the
/// API does not promise that, so both are decoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangeValue {
    pub messaging_product: String,
    pub metadata: Option<Metadata>,
    pub contacts: Vec<Contact>,
    pub messages: Vec<Message>,
    pub statuses: Vec<MessageStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub display_phone_number: String,
    pub phone_number_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub wa_id: String,
    pub profile: Option<ContactProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactProfile {
    pub name: String,
}

/// One inbound message. `message_type` is `text` for plain text; media and
/// everything else only carry their type string here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Message {
    pub from: String,
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextContent {
    pub body: String,
}

/// Delivery state callback for a previously sent message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageStatus {
    pub id: String,
    pub status: String,
    pub timestamp: String,
    pub recipient_id: String,
}
