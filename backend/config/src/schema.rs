use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env::MissingEnvVarError;

/// HTTP server settings. These always resolve, falling back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub webhook_path: String,
    pub log_level: String,
    /// Directory for rolling NDJSON logs. Console only when unset.
    pub log_dir: Option<String>,
}

/// WhatsApp Cloud API credentials and endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    pub access_token: String,
    pub verify_token: String,
    /// Sender phone-number id used to address the send endpoint.
    pub phone_number_id: String,
    pub api_version: String,
    pub graph_base_url: String,
    pub send_timeout_secs: u64,
}

impl WhatsAppConfig {
    /// `{base}/{version}/{phone_number_id}/messages`
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.graph_base_url.trim_end_matches('/'),
            self.api_version,
            self.phone_number_id
        )
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

/// Process-wide configuration, built once at startup and never mutated.
///
/// The WhatsApp section is kept as a `Result` so that missing secrets degrade
/// the webhook to a configuration error instead of preventing startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub server: ServerConfig,
    pub whatsapp: Result<WhatsAppConfig, MissingEnvVarError>,
}

impl BotConfig {
    pub fn is_configured(&self) -> bool {
        self.whatsapp.is_ok()
    }

    /// JSON view of the config with secrets still in place. Pass it through
    /// [`crate::redact`] before showing it anywhere.
    pub fn to_value(&self) -> serde_json::Value {
        let whatsapp = match &self.whatsapp {
            Ok(wa) => serde_json::to_value(wa).unwrap_or(serde_json::Value::Null),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        serde_json::json!({
            "server": serde_json::to_value(&self.server).unwrap_or(serde_json::Value::Null),
            "whatsapp": whatsapp,
        })
    }
}
