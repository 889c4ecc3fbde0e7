//! Webhook verification and payload normalization.

use std::collections::HashMap;

use {
    secrecy::ExposeSecret,
    tracing::{debug, warn},
};

use parlo_core::{InboundEvent, InboundMessage, InboundMessageKind, StatusUpdate};

use crate::{config::WhatsAppConfig, types::WebhookPayload};

/// Verify a webhook subscription handshake (GET request).
///
/// Meta sends `hub.mode=subscribe`, `hub.verify_token=<configured token>` and
/// `hub.challenge=<random string>`. Returns `Some(challenge)` only when the
/// mode and token both match.
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    config: &WhatsAppConfig,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    if mode == "subscribe" && token == config.verify_token.expose_secret() {
        Some(challenge.to_string())
    } else {
        None
    }
}

/// Normalize a webhook payload into a relay event.
///
/// The Cloud API wraps one notification per request, so only the first
/// entry/change pair is read. Anything that does not decode into a usable
/// message or status update is dropped, never errored: the webhook endpoint
/// must always acknowledge.
pub fn normalize(payload: WebhookPayload, config: &WhatsAppConfig) -> InboundEvent {
    let mut event = InboundEvent::default();

    let Some(change) = payload
        .entry
        .into_iter()
        .next()
        .and_then(|entry| entry.changes.into_iter().next())
    else {
        return event;
    };

    if change.field != "messages" {
        debug!(field = %change.field, "ignoring non-message webhook change");
        return event;
    }

    let Some(value) = change.value else {
        return event;
    };

    if let Some(ref metadata) = value.metadata
        && !config.phone_number_id.is_empty()
        && metadata.phone_number_id != config.phone_number_id
    {
        warn!(
            expected = %config.phone_number_id,
            received = %metadata.phone_number_id,
            "phone number ID mismatch, dropping webhook change"
        );
        return event;
    }

    // Contact lookup for display names.
    let names: HashMap<String, String> = value
        .contacts
        .iter()
        .filter_map(|c| {
            c.profile
                .as_ref()
                .map(|p| (c.wa_id.clone(), p.name.clone()))
        })
        .collect();

    // The contacts block names the conversation peer; messages fall back to
    // their own `from` field when it is absent.
    let first_contact_id = value
        .contacts
        .first()
        .map(|c| c.wa_id.clone())
        .filter(|id| !id.is_empty());

    for status in value.statuses {
        if status.id.is_empty() || status.status.is_empty() {
            debug!("dropping status update with missing id or status");
            continue;
        }
        event.statuses.push(StatusUpdate {
            external_message_id: status.id,
            status: status.status,
        });
    }

    for message in value.messages {
        let sender_id = first_contact_id
            .clone()
            .or_else(|| (!message.from.is_empty()).then(|| message.from.clone()));
        let sender_name = sender_id.as_ref().and_then(|id| names.get(id).cloned());
        let external_id = (!message.id.is_empty()).then(|| message.id.clone());

        let kind = if message.message_type == "text" {
            InboundMessageKind::Text {
                body: message.text.map(|t| t.body).unwrap_or_default(),
            }
        } else {
            InboundMessageKind::Unsupported {
                message_type: message.message_type,
            }
        };

        event.messages.push(InboundMessage {
            sender_id,
            sender_name,
            external_id,
            kind,
        });
    }

    event
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {secrecy::Secret, serde_json::json};

    use super::*;

    fn verify_config(token: &str) -> WhatsAppConfig {
        WhatsAppConfig {
            verify_token: Secret::new(token.into()),
            ..WhatsAppConfig::default()
        }
    }

    fn payload(value: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(value).unwrap()
    }

    fn text_message_payload() -> WebhookPayload {
        payload(json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "102290129340398",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {
                            "display_phone_number": "15550123456",
                            "phone_number_id": "106540352242922"
                        },
                        "contacts": [{
                            "profile": { "name": "Ada" },
                            "wa_id": "15551234567"
                        }],
                        "messages": [{
                            "from": "15551234567",
                            "id": "wamid.ABGG",
                            "timestamp": "1700000000",
                            "type": "text",
                            "text": { "body": "Hello" }
                        }]
                    }
                }]
            }]
        }))
    }

    #[test]
    fn verify_subscription_valid() {
        let result = verify_subscription(
            Some("subscribe"),
            Some("my_token"),
            Some("challenge_123"),
            &verify_config("my_token"),
        );
        assert_eq!(result, Some("challenge_123".to_string()));
    }

    #[test]
    fn verify_subscription_invalid_token() {
        let result = verify_subscription(
            Some("subscribe"),
            Some("wrong_token"),
            Some("challenge_123"),
            &verify_config("my_token"),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn verify_subscription_wrong_mode() {
        let result = verify_subscription(
            Some("unsubscribe"),
            Some("my_token"),
            Some("challenge_123"),
            &verify_config("my_token"),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn verify_subscription_missing_params() {
        let config = verify_config("my_token");
        assert_eq!(
            verify_subscription(None, Some("my_token"), Some("c"), &config),
            None
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), None, Some("c"), &config),
            None
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("my_token"), None, &config),
            None
        );
    }

    #[test]
    fn normalize_text_message() {
        let event = normalize(text_message_payload(), &WhatsAppConfig::default());

        assert!(event.statuses.is_empty());
        assert_eq!(event.messages.len(), 1);
        let message = &event.messages[0];
        assert_eq!(message.sender_id.as_deref(), Some("15551234567"));
        assert_eq!(message.sender_name.as_deref(), Some("Ada"));
        assert_eq!(message.external_id.as_deref(), Some("wamid.ABGG"));
        assert_eq!(
            message.kind,
            InboundMessageKind::Text {
                body: "Hello".into()
            }
        );
    }

    #[test]
    fn normalize_status_update() {
        let event = normalize(
            payload(json!({
                "entry": [{
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "statuses": [{
                                "id": "wamid.SENT",
                                "status": "delivered",
                                "timestamp": "1700000100",
                                "recipient_id": "15551234567"
                            }]
                        }
                    }]
                }]
            })),
            &WhatsAppConfig::default(),
        );

        assert!(event.messages.is_empty());
        assert_eq!(
            event.statuses,
            vec![StatusUpdate {
                external_message_id: "wamid.SENT".into(),
                status: "delivered".into()
            }]
        );
    }

    #[test]
    fn normalize_drops_status_without_id() {
        let event = normalize(
            payload(json!({
                "entry": [{
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "statuses": [
                                { "status": "delivered" },
                                { "id": "wamid.OK", "status": "read" }
                            ]
                        }
                    }]
                }]
            })),
            &WhatsAppConfig::default(),
        );

        assert_eq!(event.statuses.len(), 1);
        assert_eq!(event.statuses[0].external_message_id, "wamid.OK");
    }

    #[test]
    fn normalize_ignores_non_message_field() {
        let event = normalize(
            payload(json!({
                "entry": [{
                    "changes": [{ "field": "account_update", "value": {} }]
                }]
            })),
            &WhatsAppConfig::default(),
        );
        assert!(event.is_empty());
    }

    #[test]
    fn normalize_empty_payload() {
        let event = normalize(payload(json!({})), &WhatsAppConfig::default());
        assert!(event.is_empty());
    }

    #[test]
    fn normalize_rejects_phone_number_mismatch() {
        let config = WhatsAppConfig {
            phone_number_id: "999999".into(),
            ..WhatsAppConfig::default()
        };
        let event = normalize(text_message_payload(), &config);
        assert!(event.is_empty());
    }

    #[test]
    fn normalize_accepts_matching_phone_number() {
        let config = WhatsAppConfig {
            phone_number_id: "106540352242922".into(),
            ..WhatsAppConfig::default()
        };
        let event = normalize(text_message_payload(), &config);
        assert_eq!(event.messages.len(), 1);
    }

    #[test]
    fn normalize_unsupported_message_type() {
        let event = normalize(
            payload(json!({
                "entry": [{
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "contacts": [{ "wa_id": "15551234567" }],
                            "messages": [{
                                "from": "15551234567",
                                "id": "wamid.IMG",
                                "type": "image"
                            }]
                        }
                    }]
                }]
            })),
            &WhatsAppConfig::default(),
        );

        assert_eq!(event.messages.len(), 1);
        assert_eq!(
            event.messages[0].kind,
            InboundMessageKind::Unsupported {
                message_type: "image".into()
            }
        );
        assert_eq!(event.messages[0].sender_name, None);
    }

    #[test]
    fn normalize_falls_back_to_message_from() {
        let event = normalize(
            payload(json!({
                "entry": [{
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "messages": [{
                                "from": "15557654321",
                                "id": "wamid.NOCONTACT",
                                "type": "text",
                                "text": { "body": "hi" }
                            }]
                        }
                    }]
                }]
            })),
            &WhatsAppConfig::default(),
        );

        assert_eq!(
            event.messages[0].sender_id.as_deref(),
            Some("15557654321")
        );
    }

    #[test]
    fn normalize_missing_sender_yields_none() {
        let event = normalize(
            payload(json!({
                "entry": [{
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "messages": [{ "type": "text", "text": { "body": "hi" } }]
                        }
                    }]
                }]
            })),
            &WhatsAppConfig::default(),
        );

        assert_eq!(event.messages.len(), 1);
        assert_eq!(event.messages[0].sender_id, None);
    }

    #[test]
    fn normalize_reads_only_first_entry_and_change() {
        let event = normalize(
            payload(json!({
                "entry": [
                    {
                        "changes": [
                            {
                                "field": "messages",
                                "value": {
                                    "contacts": [{ "wa_id": "111" }],
                                    "messages": [{
                                        "from": "111",
                                        "id": "wamid.FIRST",
                                        "type": "text",
                                        "text": { "body": "first" }
                                    }]
                                }
                            },
                            {
                                "field": "messages",
                                "value": {
                                    "messages": [{
                                        "from": "222",
                                        "id": "wamid.SECOND",
                                        "type": "text",
                                        "text": { "body": "second" }
                                    }]
                                }
                            }
                        ]
                    },
                    {
                        "changes": [{
                            "field": "messages",
                            "value": {
                                "messages": [{
                                    "from": "333",
                                    "id": "wamid.THIRD",
                                    "type": "text",
                                    "text": { "body": "third" }
                                }]
                            }
                        }]
                    }
                ]
            })),
            &WhatsAppConfig::default(),
        );

        assert_eq!(event.messages.len(), 1);
        assert_eq!(event.messages[0].external_id.as_deref(), Some("wamid.FIRST"));
    }

    #[test]
    fn normalize_keeps_message_order() {
        let event = normalize(
            payload(json!({
                "entry": [{
                    "changes": [{
                        "field": "messages",
                        "value": {
                            "contacts": [{ "wa_id": "15551234567" }],
                            "messages": [
                                {
                                    "from": "15551234567",
                                    "id": "wamid.A",
                                    "type": "text",
                                    "text": { "body": "one" }
                                },
                                {
                                    "from": "15551234567",
                                    "id": "wamid.B",
                                    "type": "text",
                                    "text": { "body": "two" }
                                }
                            ]
                        }
                    }]
                }]
            })),
            &WhatsAppConfig::default(),
        );

        let ids: Vec<_> = event
            .messages
            .iter()
            .filter_map(|m| m.external_id.as_deref())
            .collect();
        assert_eq!(ids, ["wamid.A", "wamid.B"]);
    }
}
