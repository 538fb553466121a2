//! WhatsApp Senders
//!
//! Renders reply specifications into Cloud API message payloads (text,
//! interactive button, interactive list) and posts them to the Graph API.

use afyabot_config::WhatsAppConfig;
use afyabot_core::{AfyaError, ReplySender, ReplySpec};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

/// Reply buttons per message.
pub const MAX_BUTTONS: usize = 3;
/// Sections per list message.
pub const MAX_SECTIONS: usize = 10;
/// Rows per list section.
pub const MAX_ROWS: usize = 10;

pub const MAX_BUTTON_TITLE: usize = 20;
pub const MAX_ROW_TITLE: usize = 24;
pub const MAX_ROW_DESCRIPTION: usize = 72;
pub const MAX_LIST_BUTTON: usize = 20;
pub const MAX_HEADER: usize = 60;
pub const MAX_FOOTER: usize = 60;
pub const MAX_INTERACTIVE_BODY: usize = 1024;
pub const MAX_TEXT_BODY: usize = 4096;

// ---------------------------------------------------------------------------
// Cloud API wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct OutboundMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(flatten)]
    content: OutboundContent<'a>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutboundContent<'a> {
    Text { text: TextObject<'a> },
    Interactive { interactive: Interactive<'a> },
}

#[derive(Serialize)]
struct TextObject<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct BodyText<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Header<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Interactive<'a> {
    Button {
        body: BodyText<'a>,
        action: ButtonAction<'a>,
    },
    List {
        #[serde(skip_serializing_if = "Option::is_none")]
        header: Option<Header<'a>>,
        body: BodyText<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<BodyText<'a>>,
        action: ListAction<'a>,
    },
}

#[derive(Serialize)]
struct ButtonAction<'a> {
    buttons: Vec<ReplyButton<'a>>,
}

#[derive(Serialize)]
struct ReplyButton<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: ButtonRef<'a>,
}

#[derive(Serialize)]
struct ButtonRef<'a> {
    id: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
struct ListAction<'a> {
    button: &'a str,
    sections: Vec<Section<'a>>,
}

#[derive(Serialize)]
struct Section<'a> {
    title: &'a str,
    rows: Vec<Row<'a>>,
}

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

fn outbound<'a>(to: &'a str, reply: &'a ReplySpec) -> OutboundMessage<'a> {
    let content = match reply {
        ReplySpec::Text { body } => OutboundContent::Text {
            text: TextObject { body },
        },
        ReplySpec::Buttons { body, buttons } => OutboundContent::Interactive {
            interactive: Interactive::Button {
                body: BodyText { text: body },
                action: ButtonAction {
                    buttons: buttons
                        .iter()
                        .take(MAX_BUTTONS)
                        .map(|b| ReplyButton {
                            kind: "reply",
                            reply: ButtonRef {
                                id: &b.id,
                                title: &b.title,
                            },
                        })
                        .collect(),
                },
            },
        },
        ReplySpec::List {
            header,
            body,
            footer,
            button,
            sections,
        } => OutboundContent::Interactive {
            interactive: Interactive::List {
                header: header.as_deref().map(|text| Header { kind: "text", text }),
                body: BodyText { text: body },
                footer: footer.as_deref().map(|text| BodyText { text }),
                action: ListAction {
                    button,
                    sections: sections
                        .iter()
                        .take(MAX_SECTIONS)
                        .map(|s| Section {
                            title: &s.title,
                            rows: s
                                .rows
                                .iter()
                                .take(MAX_ROWS)
                                .map(|r| Row {
                                    id: &r.id,
                                    title: &r.title,
                                    description: r.description.as_deref(),
                                })
                                .collect(),
                        })
                        .collect(),
                },
            },
        },
    };

    OutboundMessage {
        messaging_product: "whatsapp",
        to,
        content,
    }
}

/// Render the Cloud API JSON body for sending `reply` to `to`.
///
/// Buttons, sections and rows beyond the platform limits are dropped.
pub fn render_payload(to: &str, reply: &ReplySpec) -> Value {
    serde_json::to_value(outbound(to, reply)).unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// Platform limit lint
// ---------------------------------------------------------------------------

/// A field that the Cloud API would reject or that rendering will truncate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadIssue {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for PayloadIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn check(issues: &mut Vec<PayloadIssue>, path: impl Into<String>, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        issues.push(PayloadIssue {
            path: path.into(),
            message: format!("{len} chars exceeds limit of {max}"),
        });
    }
}

/// Check a reply against the Cloud API field limits.
pub fn lint_reply(reply: &ReplySpec) -> Vec<PayloadIssue> {
    let mut issues = Vec::new();

    match reply {
        ReplySpec::Text { body } => check(&mut issues, "text.body", body, MAX_TEXT_BODY),
        ReplySpec::Buttons { body, buttons } => {
            check(&mut issues, "interactive.body", body, MAX_INTERACTIVE_BODY);
            for (i, b) in buttons.iter().enumerate() {
                check(&mut issues, format!("buttons[{i}].title"), &b.title, MAX_BUTTON_TITLE);
            }
            if buttons.len() > MAX_BUTTONS {
                issues.push(PayloadIssue {
                    path: "buttons".into(),
                    message: format!("{} buttons, only the first {MAX_BUTTONS} are sent", buttons.len()),
                });
            }
        }
        ReplySpec::List {
            header,
            body,
            footer,
            button,
            sections,
        } => {
            if let Some(h) = header {
                check(&mut issues, "interactive.header", h, MAX_HEADER);
            }
            check(&mut issues, "interactive.body", body, MAX_INTERACTIVE_BODY);
            if let Some(ft) = footer {
                check(&mut issues, "interactive.footer", ft, MAX_FOOTER);
            }
            check(&mut issues, "action.button", button, MAX_LIST_BUTTON);
            for (i, s) in sections.iter().enumerate() {
                for (j, r) in s.rows.iter().enumerate() {
                    check(&mut issues, format!("sections[{i}].rows[{j}].title"), &r.title, MAX_ROW_TITLE);
                    if let Some(d) = &r.description {
                        check(
                            &mut issues,
                            format!("sections[{i}].rows[{j}].description"),
                            d,
                            MAX_ROW_DESCRIPTION,
                        );
                    }
                }
                if s.rows.len() > MAX_ROWS {
                    issues.push(PayloadIssue {
                        path: format!("sections[{i}].rows"),
                        message: format!("{} rows, only the first {MAX_ROWS} are sent", s.rows.len()),
                    });
                }
            }
            if sections.len() > MAX_SECTIONS {
                issues.push(PayloadIssue {
                    path: "sections".into(),
                    message: format!(
                        "{} sections, only the first {MAX_SECTIONS} are sent",
                        sections.len()
                    ),
                });
            }
        }
    }
    issues
}

// ---------------------------------------------------------------------------
// Graph API client
// ---------------------------------------------------------------------------

/// Posts messages to `{graph_base}/{version}/{phone_number_id}/messages`.
#[derive(Clone)]
pub struct GraphApiClient {
    http_client: Client,
    messages_url: String,
    access_token: String,
}

impl GraphApiClient {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, AfyaError> {
        let http_client = Client::builder()
            .timeout(config.send_timeout())
            .build()
            .map_err(|e| AfyaError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            messages_url: config.messages_url(),
            access_token: config.access_token.clone(),
        })
    }

    /// Send one payload. Returns the platform's response body, or
    /// `{ "raw": .., "status": .. }` when it is not JSON.
    pub async fn send_payload(&self, payload: &Value) -> Result<Value, AfyaError> {
        let res = self
            .http_client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| AfyaError::DispatchFailed(format!("request failed: {e}")))?;

        let status = res.status();
        let raw = res.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&raw)
            .unwrap_or_else(|_| serde_json::json!({ "raw": raw, "status": status.as_u16() }));

        if !status.is_success() {
            error!(status = %status, "[WhatsApp] messages endpoint rejected payload");
            return Err(AfyaError::DispatchFailed(format!(
                "Graph API returned {status}: {body}"
            )));
        }
        debug!(response = %body, "[WhatsApp] messages endpoint response");
        Ok(body)
    }
}

#[async_trait]
impl ReplySender for GraphApiClient {
    async fn send_reply(&self, to: &str, reply: &ReplySpec) -> Result<(), AfyaError> {
        let payload = render_payload(to, reply);
        self.send_payload(&payload).await?;
        info!(kind = reply.kind(), "[WhatsApp] Sent reply");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afyabot_core::{Button, ListRow, ListSection, route};
    use mockito::Matcher;
    use serde_json::json;

    fn config(base: &str) -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: "test-token".into(),
            verify_token: "verify".into(),
            phone_number_id: "1029384756".into(),
            api_version: "v19.0".into(),
            graph_base_url: base.into(),
            send_timeout_secs: 5,
        }
    }

    #[test]
    fn renders_text_payload() {
        let payload = render_payload("255700000001", &route("doctor"));
        assert_eq!(
            payload,
            json!({
                "messaging_product": "whatsapp",
                "to": "255700000001",
                "type": "text",
                "text": { "body": "Doctor consultation selected. Please describe your symptoms and we will connect you with a doctor." }
            })
        );
    }

    #[test]
    fn renders_language_buttons() {
        let payload = render_payload("255700000001", &route("hi"));
        assert_eq!(
            payload,
            json!({
                "messaging_product": "whatsapp",
                "to": "255700000001",
                "type": "interactive",
                "interactive": {
                    "type": "button",
                    "body": { "text": "Welcome to Afyaplus! Please select your preferred language:" },
                    "action": {
                        "buttons": [
                            { "type": "reply", "reply": { "id": "swahili", "title": "Kiswahili" } },
                            { "type": "reply", "reply": { "id": "english", "title": "English" } }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn renders_service_list() {
        let payload = render_payload("255700000001", &route("menu"));
        let interactive = &payload["interactive"];
        assert_eq!(payload["type"], "interactive");
        assert_eq!(interactive["type"], "list");
        assert_eq!(interactive["header"], json!({ "type": "text", "text": "Afyaplus Services" }));
        assert_eq!(interactive["body"]["text"], "Please select a service from menu:");
        assert_eq!(interactive["footer"]["text"], "Better health solutions");
        assert_eq!(interactive["action"]["button"], "Choose service");
        let section = &interactive["action"]["sections"][0];
        assert_eq!(section["title"], "Medical Services");
        assert_eq!(
            section["rows"][2],
            json!({ "id": "emergency", "title": "Emergency", "description": "Urgent medical assistance" })
        );
    }

    #[test]
    fn truncates_to_platform_limits() {
        let buttons = ReplySpec::Buttons {
            body: "pick".into(),
            buttons: (0..5)
                .map(|i| Button { id: i.to_string(), title: format!("B{i}") })
                .collect(),
        };
        let payload = render_payload("1", &buttons);
        assert_eq!(payload["interactive"]["action"]["buttons"].as_array().unwrap().len(), 3);

        let list = ReplySpec::List {
            header: None,
            body: "pick".into(),
            footer: None,
            button: "Open".into(),
            sections: (0..12)
                .map(|s| ListSection {
                    title: format!("S{s}"),
                    rows: (0..15)
                        .map(|r| ListRow { id: format!("{s}-{r}"), title: "t".into(), description: None })
                        .collect(),
                })
                .collect(),
        };
        let payload = render_payload("1", &list);
        let sections = payload["interactive"]["action"]["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 10);
        assert_eq!(sections[0]["rows"].as_array().unwrap().len(), 10);
        assert!(payload["interactive"].get("header").is_none());
        assert!(sections[0]["rows"][0].get("description").is_none());
    }

    #[test]
    fn canonical_flow_is_within_limits() {
        for token in ["hi", "menu", "swahili", "english", "doctor", "pharmacy", "emergency", ""] {
            assert!(lint_reply(&route(token)).is_empty(), "token {token:?}");
        }
    }

    #[test]
    fn lint_flags_long_titles() {
        let reply = ReplySpec::Buttons {
            body: "pick".into(),
            buttons: vec![Button {
                id: "x".into(),
                title: "Chat - TZS 25,000 per session".into(),
            }],
        };
        let issues = lint_reply(&reply);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "buttons[0].title");
    }

    #[tokio::test]
    async fn sends_payload_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let expected = render_payload("255700000001", &route("english"));
        let mock = server
            .mock("POST", "/v19.0/1029384756/messages")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::Json(expected))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "messages": [{ "id": "wamid.XYZ" }] }).to_string())
            .create_async()
            .await;

        let client = GraphApiClient::new(&config(&server.url())).unwrap();
        client.send_reply("255700000001", &route("english")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_send_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v19.0/1029384756/messages")
            .with_status(401)
            .with_body(json!({ "error": { "message": "Invalid OAuth access token" } }).to_string())
            .create_async()
            .await;

        let client = GraphApiClient::new(&config(&server.url())).unwrap();
        let err = client.send_reply("1", &route("hi")).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn non_json_response_is_wrapped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v19.0/1029384756/messages")
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let client = GraphApiClient::new(&config(&server.url())).unwrap();
        let body = client.send_payload(&json!({})).await.unwrap();
        assert_eq!(body, json!({ "raw": "OK", "status": 200 }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let client = GraphApiClient::new(&config("http://127.0.0.1:9")).unwrap();
        let err = client.send_reply("1", &route("hi")).await.unwrap_err();
        assert!(matches!(err, AfyaError::DispatchFailed(_)));
    }
}
