//! Bot Event Logger
//!
//! Structured conversation events (verification, inbound, reply, failure)
//! emitted under the `bot_events` target so they can be filtered or shipped
//! separately from operational logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotEvent {
    VerificationAttempt {
        mode: String,
        accepted: bool,
    },
    InboundMessage {
        from: String,
        token: String,
        dropped: usize,
    },
    ReplyDispatched {
        to: String,
        kind: String,
    },
    DispatchFailed {
        to: String,
        kind: String,
        error_msg: String,
    },
}

impl BotEvent {
    fn is_failure(&self) -> bool {
        matches!(self, BotEvent::DispatchFailed { .. })
    }

    fn redact(&mut self) {
        match self {
            BotEvent::VerificationAttempt { .. } => {}
            BotEvent::InboundMessage { from, token, .. } => {
                *from = redact_sensitive_data(from);
                *token = redact_sensitive_data(token);
            }
            BotEvent::ReplyDispatched { to, .. } => {
                *to = redact_sensitive_data(to);
            }
            BotEvent::DispatchFailed { to, error_msg, .. } => {
                *to = redact_sensitive_data(to);
                *error_msg = redact_sensitive_data(error_msg);
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: BotEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts and records a bot event, returning the entry that was logged.
    pub fn log_event(request_id: &str, mut event: BotEvent) -> EventLogEntry {
        event.redact();

        let entry = EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        if entry.event.is_failure() {
            warn!(target: "bot_events", event = %json, "Bot event");
        } else {
            info!(target: "bot_events", event = %json, "Bot event");
        }
        entry
    }
}
