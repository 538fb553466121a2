//! `afyabot-config`: Afyabot runtime configuration.
//!
//! Provides:
//! - Typed config schema (HTTP server, WhatsApp Cloud credentials)
//! - Loading from environment variables, once, at startup
//! - Default values
//! - Config redaction for safe logging/display
//! - Validation report with errors and warnings

pub mod defaults;
pub mod env;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::MissingEnvVarError;
pub use redact::{collect_redacted_paths, redact};
pub use schema::{BotConfig, ServerConfig, WhatsAppConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport, MISSING_VAR_PREFIX};
