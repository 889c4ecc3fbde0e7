use {
    async_trait::async_trait,
    parlo_core::{ConversationMessage, Error, MessageRole, ReplyGenerator, Result},
    secrecy::ExposeSecret,
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::config::GeminiConfig;

/// Canned reply used whenever the model call fails.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble responding. Please try again.";

/// Reply used when the model answers without any usable candidate text.
pub const EMPTY_CANDIDATE_REPLY: &str = "Cannot generate reply";

/// One conversation turn in Gemini's wire format.
///
/// Shared between request and response; responses may omit fields, so both
/// are defaulted on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Reply generator backed by the Gemini `generateContent` endpoint.
///
/// Each call is stateless: the caller's history window is replayed as the
/// conversation prefix and the new message is appended as the final user turn.
pub struct GeminiGenerator {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiGenerator {
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn request_reply(
        &self,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String> {
        let mut contents = history_to_contents(history);
        contents.push(Content {
            role: "user".into(),
            parts: vec![Part {
                text: message.to_string(),
            }],
        });

        debug!(
            model = %self.config.model,
            turns = contents.len(),
            "requesting model reply"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&GenerateContentRequest { contents })
            .send()
            .await
            .map_err(|e| Error::external("send generateContent request", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::unavailable(format!(
                "gemini returned {status}: {body}"
            )));
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .map_err(|e| Error::external("decode generateContent response", e))?;
        Ok(extract_reply(&parsed))
    }
}

/// Map stored history onto Gemini turns. Assistant rows become `model` turns.
fn history_to_contents(history: &[ConversationMessage]) -> Vec<Content> {
    history
        .iter()
        .map(|message| Content {
            role: match message.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            }
            .into(),
            parts: vec![Part {
                text: message.content.clone(),
            }],
        })
        .collect()
}

fn extract_reply(response: &GenerateContentResponse) -> String {
    let text: String = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        EMPTY_CANDIDATE_REPLY.to_string()
    } else {
        text
    }
}

#[async_trait]
impl ReplyGenerator for GeminiGenerator {
    async fn generate(&self, message: &str, history: &[ConversationMessage]) -> String {
        match self.request_reply(message, history).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "reply generation failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            },
        }
    }
}
