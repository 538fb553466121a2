//! CLI Status Command
//!
//! Queries `/health` on the local server.

use anyhow::Result;

use crate::terminal_output::{note_error, note_ok, note_warn};

pub async fn run(port: u16) -> Result<()> {
    let client = reqwest::Client::new();
    match client
        .get(format!("http://localhost:{port}/health"))
        .send()
        .await
    {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            if body["configured"] == serde_json::Value::Bool(false) {
                note_warn("Server is up but WhatsApp credentials are missing; webhook answers 500");
            } else {
                note_ok("Server is up");
            }
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => {
            note_error(&format!("Afyabot is not running on port {port}"));
        }
    }
    Ok(())
}
