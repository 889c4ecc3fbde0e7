//! Outbound message delivery through the Graph API.

use {
    async_trait::async_trait,
    parlo_core::{DeliverySender, Error, Result, SendReceipt},
    secrecy::ExposeSecret,
    serde::Deserialize,
    serde_json::json,
    tracing::{info, warn},
};

use crate::{
    config::WhatsAppConfig,
    text::{WHATSAPP_MAX_MESSAGE_LEN, truncate_with_marker},
};

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Sends text messages via the WhatsApp Cloud API.
pub struct CloudApiSender {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl CloudApiSender {
    #[must_use]
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Post one text message, returning the provider message id when the API
    /// reports one.
    pub async fn post_message(&self, to: &str, body_text: &str) -> Result<Option<String>> {
        if to.is_empty() {
            return Err(Error::invalid_input("recipient id is empty"));
        }

        let url = format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            self.config.phone_number_id
        );

        let payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": body_text,
            },
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::external("send whatsapp message", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::unavailable(format!(
                "whatsapp send failed ({status}): {body}"
            )));
        }

        let parsed: SendMessageResponse = resp
            .json()
            .await
            .map_err(|e| Error::external("decode whatsapp send response", e))?;
        Ok(parsed.messages.into_iter().next().map(|m| m.id))
    }
}

#[async_trait]
impl DeliverySender for CloudApiSender {
    async fn send_text(&self, user_id: &str, text: &str) -> SendReceipt {
        let outgoing = truncate_with_marker(text, WHATSAPP_MAX_MESSAGE_LEN);
        let truncated = outgoing.len() < text.len();

        match self.post_message(user_id, &outgoing).await {
            Ok(external_message_id) => {
                info!(to = user_id, truncated, "whatsapp message sent");
                SendReceipt {
                    success: true,
                    external_message_id,
                }
            },
            Err(err) => {
                warn!(to = user_id, error = %err, "whatsapp send failed");
                SendReceipt::failure()
            },
        }
    }
}
