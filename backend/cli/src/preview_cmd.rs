//! CLI Preview Command
//!
//! Prints the exact Cloud API body the webhook would post for a message, and
//! flags fields that break platform limits.

use anyhow::Result;
use serde_json::Value;

use afyabot_channels::{lint_reply, render_payload, PayloadIssue};
use afyabot_core::{route, Intent};

use crate::terminal_output::{note_ok, note_warn};

pub fn preview(text: &str, reply_id: bool, to: &str) -> (Value, Vec<PayloadIssue>) {
    let intent = if reply_id {
        Intent::from_reply_id(text)
    } else {
        Intent::from_text(text)
    };
    let reply = route(intent.as_str());
    (render_payload(to, &reply), lint_reply(&reply))
}

pub fn run(text: &str, reply_id: bool, to: &str) -> Result<()> {
    let (payload, issues) = preview(text, reply_id, to);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    if issues.is_empty() {
        note_ok("Payload is within WhatsApp limits");
    }
    for issue in &issues {
        note_warn(&issue.to_string());
    }
    Ok(())
}
