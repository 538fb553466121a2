//! Telemetry and structured logging components for Afyabot.
//!
//! Handles log redaction, console and rolling NDJSON output, and bot event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{BotEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
