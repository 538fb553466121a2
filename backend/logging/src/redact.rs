//! Log Redaction Layer
//!
//! Scrubs access tokens and phone numbers from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\-.\s]{8,14}\d").unwrap());
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)|(EAA[a-zA-Z0-9]{20,})").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = TOKEN_RE.replace_all(input, "[REDACTED_TOKEN]");
    TELEPHONE_RE
        .replace_all(&redacted, "[REDACTED_PHONE]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Sending to +1-555-123-4567 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn redacts_whatsapp_ids_and_graph_tokens() {
        let clean = redact_sensitive_data("from 255627404843 token EAAGm0PX4ZCpsBAKZCjdk3mZAZBZ");
        assert_eq!(clean, "from [REDACTED_PHONE] token [REDACTED_TOKEN]");
    }

    #[test]
    fn leaves_short_text_alone() {
        assert_eq!(redact_sensitive_data("menu"), "menu");
        assert_eq!(redact_sensitive_data("I need 2 pills"), "I need 2 pills");
    }
}
