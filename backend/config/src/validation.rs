//! Config validation: checks with user-friendly error messages.

use thiserror::Error;

use crate::schema::{BotConfig, ServerConfig, WhatsAppConfig};

/// Path prefix of errors reported for unset credentials.
pub const MISSING_VAR_PREFIX: &str = "env.";

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors the server cannot start with. Unset credentials are left out:
    /// the webhook still mounts and answers 500 until they are provided.
    pub fn startup_errors(&self) -> Vec<&ConfigValidationError> {
        self.errors
            .iter()
            .filter(|e| !e.path.starts_with(MISSING_VAR_PREFIX))
            .collect()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &BotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(&config.server, &mut report);
    match &config.whatsapp {
        Ok(wa) => validate_whatsapp(wa, &mut report),
        Err(missing) => {
            for var in &missing.var_names {
                report.error(format!("{MISSING_VAR_PREFIX}{var}"), "Required variable is unset or empty");
            }
        }
    }
    report
}

fn validate_server(server: &ServerConfig, report: &mut ValidationReport) {
    if !server.webhook_path.starts_with('/') {
        report.error("server.webhook_path", "Webhook path must start with '/'");
    }
    if server.webhook_path == "/health" {
        report.error("server.webhook_path", "Webhook path collides with the health route");
    }
    if server.port < 1024 && server.port != 80 && server.port != 443 {
        report.warn(
            "server.port",
            format!("Port {} requires elevated privileges; consider using a port >= 1024", server.port),
        );
    }
}

fn validate_whatsapp(wa: &WhatsAppConfig, report: &mut ValidationReport) {
    if !wa.api_version.starts_with('v') {
        report.warn(
            "whatsapp.api_version",
            format!("Graph API versions look like 'v19.0', got '{}'", wa.api_version),
        );
    }
    if !(wa.graph_base_url.starts_with("https://") || wa.graph_base_url.starts_with("http://")) {
        report.error("whatsapp.graph_base_url", "Graph base URL must be http(s)");
    } else if wa.graph_base_url.starts_with("http://") {
        report.warn("whatsapp.graph_base_url", "Graph base URL is not TLS; only use this for local testing");
    }
    if wa.send_timeout_secs == 0 {
        report.error("whatsapp.send_timeout_secs", "Send timeout must be >= 1 second");
    }
    if !wa.phone_number_id.chars().all(|c| c.is_ascii_digit()) {
        report.warn("whatsapp.phone_number_id", "Phone number id is expected to be numeric");
    }
}
