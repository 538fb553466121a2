//! Environment variable loading.
//!
//! Configuration is read once from the process environment. Every loader has a
//! `_with` / `_map` twin taking an explicit map so tests never touch the real
//! environment.

use std::collections::HashMap;

use crate::defaults::*;
use crate::schema::{BotConfig, ServerConfig, WhatsAppConfig};

pub const ACCESS_TOKEN_VAR: &str = "WHATSAPP_ACCESS_TOKEN";
pub const VERIFY_TOKEN_VAR: &str = "WHATSAPP_VERIFY_TOKEN";
pub const PHONE_NUMBER_ID_VAR: &str = "WHATSAPP_PHONE_NUMBER_ID";
pub const API_VERSION_VAR: &str = "WHATSAPP_API_VERSION";
pub const GRAPH_BASE_URL_VAR: &str = "WHATSAPP_GRAPH_BASE_URL";
pub const SEND_TIMEOUT_VAR: &str = "WHATSAPP_SEND_TIMEOUT_SECS";
pub const BIND_VAR: &str = "AFYABOT_BIND";
pub const PORT_VAR: &str = "AFYABOT_PORT";
pub const WEBHOOK_PATH_VAR: &str = "AFYABOT_WEBHOOK_PATH";
pub const LOG_DIR_VAR: &str = "AFYABOT_LOG_DIR";
pub const LOG_LEVEL_VAR: &str = "RUST_LOG";

/// One or more required variables were unset or empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required env var(s): {}", var_names.join(", "))]
pub struct MissingEnvVarError {
    pub var_names: Vec<String>,
}

impl BotConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Load configuration from a provided map (useful for testing).
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        Self {
            server: ServerConfig::from_env_map(env),
            whatsapp: WhatsAppConfig::from_env_map(env),
        }
    }
}

impl ServerConfig {
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        Self {
            bind_address: optional(env, BIND_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: optional(env, PORT_VAR)
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            webhook_path: optional(env, WEBHOOK_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string()),
            log_level: optional(env, LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: optional(env, LOG_DIR_VAR),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env_map(&HashMap::new())
    }
}

impl WhatsAppConfig {
    /// Resolve credentials. All three secrets are reported together when missing.
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self, MissingEnvVarError> {
        let access_token = optional(env, ACCESS_TOKEN_VAR);
        let verify_token = optional(env, VERIFY_TOKEN_VAR);
        let phone_number_id = optional(env, PHONE_NUMBER_ID_VAR);

        let (Some(access_token), Some(verify_token), Some(phone_number_id)) =
            (access_token.clone(), verify_token.clone(), phone_number_id.clone())
        else {
            let var_names = [
                (ACCESS_TOKEN_VAR, access_token.is_none()),
                (VERIFY_TOKEN_VAR, verify_token.is_none()),
                (PHONE_NUMBER_ID_VAR, phone_number_id.is_none()),
            ]
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| name.to_string())
            .collect();
            return Err(MissingEnvVarError { var_names });
        };

        Ok(Self {
            access_token,
            verify_token,
            phone_number_id,
            api_version: optional(env, API_VERSION_VAR)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            graph_base_url: optional(env, GRAPH_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string()),
            send_timeout_secs: optional(env, SEND_TIMEOUT_VAR)
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SEND_TIMEOUT_SECS),
        })
    }
}

/// Trimmed value, with empty treated as unset.
fn optional(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
