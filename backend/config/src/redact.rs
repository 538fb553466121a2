//! Config redaction: produce safe-to-share config snapshots by masking sensitive fields.
//!
//! Masks access tokens, verify tokens and phone-number identifiers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "access_token",
    "accessToken",
    "verify_token",
    "verifyToken",
    "phone_number_id",
    "phoneNumberId",
    "token",
    "secret",
];

/// Phone numbers and numeric phone-number ids.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{10,15}$").unwrap());

/// Redact a config JSON value, replacing sensitive strings with a 4-char hint + `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn hint(s: &str) -> String {
    if s.chars().count() > 4 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_string(s: &str, key: &str) -> Value {
    if s.is_empty() {
        return Value::String(String::new());
    }
    if is_sensitive_key(key) || PHONE_PATTERN.is_match(s) {
        return Value::String(hint(s));
    }
    Value::String(s.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

/// Collect all field paths that would be redacted (for diagnostics).
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths_recursive(value, "", &mut paths);
    paths
}

fn collect_paths_recursive(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => {
            let key = path.rsplit('.').next().unwrap_or("");
            if is_sensitive_key(key) || PHONE_PATTERN.is_match(s) {
                out.push(path.to_string());
            }
        }
        Value::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                collect_paths_recursive(v, &format!("{path}[{i}]"), out);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                collect_paths_recursive(v, &child_path, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_tokens() {
        let v = json!({ "whatsapp": { "access_token": "EAAGabcdef123", "verify_token": "xyz" } });
        let redacted = redact(&v);
        assert_eq!(redacted["whatsapp"]["access_token"], "EAAG***");
        assert_eq!(redacted["whatsapp"]["verify_token"], "***");
    }

    #[test]
    fn redacts_phone_like_values_anywhere() {
        let v = json!({ "recipients": ["+255627404843"] });
        let redacted = redact(&v);
        assert_eq!(redacted["recipients"][0], "+255***");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "server": { "log_level": "debug", "port": 8080 } });
        assert_eq!(redact(&v), v);
    }

    #[test]
    fn collects_paths() {
        let v = json!({ "whatsapp": { "access_token": "t0ken", "api_version": "v19.0" } });
        assert_eq!(collect_redacted_paths(&v), vec!["whatsapp.access_token"]);
    }
}
