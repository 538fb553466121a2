//! CLI Check-Config Command
//!
//! Shows the redacted configuration and the validation report.

use anyhow::{bail, Result};

use afyabot_config::{collect_redacted_paths, redact, validate, BotConfig};

use crate::terminal_output::{dim, note_error, note_ok, note_warn};

pub fn run(config: &BotConfig) -> Result<()> {
    let raw = config.to_value();
    println!("{}", serde_json::to_string_pretty(&redact(&raw))?);
    let masked = collect_redacted_paths(&raw);
    if !masked.is_empty() {
        println!("{}", dim(&format!("masked: {}", masked.join(", "))));
    }

    let report = validate(config);
    for warning in &report.warnings {
        note_warn(&warning.to_string());
    }
    for error in &report.errors {
        note_error(&error.to_string());
    }
    if !report.is_valid() {
        bail!("configuration has {} error(s)", report.errors.len());
    }
    note_ok("Configuration is valid");
    Ok(())
}
