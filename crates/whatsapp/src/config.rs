use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Configuration for one WhatsApp Cloud API phone number.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    /// Graph API access token for outbound sends.
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: Secret<String>,

    /// Phone number ID that owns this webhook subscription.
    pub phone_number_id: String,

    /// Token echoed by Meta during webhook subscription verification.
    #[serde(serialize_with = "serialize_secret")]
    pub verify_token: Secret<String>,

    /// Graph API base URL, including the API version segment.
    pub api_base: String,
}

impl std::fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("access_token", &"[REDACTED]")
            .field("phone_number_id", &self.phone_number_id)
            .field("verify_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: Secret::new(String::new()),
            phone_number_id: String::new(),
            verify_token: Secret::new(String::new()),
            api_base: "https://graph.facebook.com/v21.0".into(),
        }
    }
}
