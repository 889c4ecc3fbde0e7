use {anyhow::Context, secrecy::Secret};

use {parlo_gemini::GeminiConfig, parlo_whatsapp::WhatsAppConfig};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8558;

/// Everything the relay needs to start, resolved from the environment.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
    /// Path of the SQLite database file.
    pub db_path: String,
    pub whatsapp: WhatsAppConfig,
    pub gemini: GeminiConfig,
}

impl RelayConfig {
    /// Resolve the full relay configuration from `PARLO_*` environment
    /// variables. Credentials are required; everything else has defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut whatsapp = WhatsAppConfig {
            access_token: Secret::new(require_env("PARLO_WHATSAPP_TOKEN")?),
            phone_number_id: require_env("PARLO_PHONE_NUMBER_ID")?,
            verify_token: Secret::new(require_env("PARLO_VERIFY_TOKEN")?),
            ..WhatsAppConfig::default()
        };
        if let Ok(base) = std::env::var("PARLO_WHATSAPP_API_BASE") {
            whatsapp.api_base = base;
        }

        let mut gemini = GeminiConfig {
            api_key: Secret::new(require_env("PARLO_GEMINI_API_KEY")?),
            ..GeminiConfig::default()
        };
        if let Ok(model) = std::env::var("PARLO_GEMINI_MODEL") {
            gemini.model = model;
        }
        if let Ok(base) = std::env::var("PARLO_GEMINI_API_BASE") {
            gemini.api_base = base;
        }

        let port = match std::env::var("PARLO_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PARLO_PORT value '{raw}'"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            bind: std::env::var("PARLO_BIND").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            db_path: std::env::var("PARLO_DB").unwrap_or_else(|_| "parlo.db".into()),
            whatsapp,
            gemini,
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} is not set"))
}
