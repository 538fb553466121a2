//! WhatsApp Cloud API channel adapter.
//!
//! Mounts the webhook route:
//!   GET  → subscription handshake (`hub.mode`, `hub.verify_token`, `hub.challenge`)
//!   POST → inbound delivery: first message → intent → reply → one send
//!   any other method → 405
//!
//! Every response on the route is 500 when the WhatsApp credentials are missing.

use std::sync::Arc;

use afyabot_config::{MissingEnvVarError, WhatsAppConfig};
use afyabot_core::{ReplySender, route};
use afyabot_logging::{BotEvent, EventLogger};
use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::ChannelAdapter;
use crate::wa_send::GraphApiClient;
use crate::wa_types::WebhookPayload;

/// Resolved webhook state. Built once; the misconfigured variant keeps the
/// reason so every request can report it.
pub enum WebhookState {
    Ready {
        verify_token: String,
        phone_number_id: String,
        sender: Arc<dyn ReplySender>,
    },
    Misconfigured(String),
}

type AppState = Arc<WebhookState>;

// Verification payload
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(rename = "hub.mode", default)]
    pub mode: String,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: String,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: String,
}

pub struct WhatsAppAdapter {
    webhook_path: String,
    state: AppState,
}

impl WhatsAppAdapter {
    /// Build the adapter from loaded configuration. Missing credentials or a
    /// client that fails to build leave the adapter mounted but misconfigured.
    pub fn from_config(
        config: &Result<WhatsAppConfig, MissingEnvVarError>,
        webhook_path: impl Into<String>,
    ) -> Self {
        let state = match config {
            Ok(wa) => match GraphApiClient::new(wa) {
                Ok(client) => WebhookState::Ready {
                    verify_token: wa.verify_token.clone(),
                    phone_number_id: wa.phone_number_id.clone(),
                    sender: Arc::new(client),
                },
                Err(e) => WebhookState::Misconfigured(e.to_string()),
            },
            Err(e) => WebhookState::Misconfigured(e.to_string()),
        };
        Self {
            webhook_path: webhook_path.into(),
            state: Arc::new(state),
        }
    }

    /// Build a ready adapter around any sender.
    pub fn with_sender(
        verify_token: impl Into<String>,
        phone_number_id: impl Into<String>,
        sender: Arc<dyn ReplySender>,
        webhook_path: impl Into<String>,
    ) -> Self {
        Self {
            webhook_path: webhook_path.into(),
            state: Arc::new(WebhookState::Ready {
                verify_token: verify_token.into(),
                phone_number_id: phone_number_id.into(),
                sender,
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(*self.state, WebhookState::Ready { .. })
    }
}

#[async_trait]
impl ChannelAdapter for WhatsAppAdapter {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn build_router(&self) -> Router {
        Router::new()
            .route(
                &self.webhook_path,
                get(verify_webhook)
                    .post(handle_webhook)
                    .fallback(method_not_allowed),
            )
            .with_state(Arc::clone(&self.state))
    }

    async fn start(&self) -> anyhow::Result<()> {
        match &*self.state {
            WebhookState::Ready { .. } => {
                info!(path = %self.webhook_path, "[WhatsApp] Adapter ready (webhook-based)")
            }
            WebhookState::Misconfigured(reason) => {
                error!(path = %self.webhook_path, %reason, "[WhatsApp] Adapter misconfigured; webhook will answer 500")
            }
        }
        Ok(())
    }
}

/// Pure handshake check: `Some(challenge)` when the subscription is accepted.
pub fn verify_subscription(request: &VerifyRequest, verify_token: &str) -> Option<String> {
    if request.mode == "subscribe" && constant_time_eq(&request.verify_token, verify_token) {
        Some(request.challenge.clone())
    } else {
        None
    }
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn configuration_error(reason: &str) -> Response {
    error!(%reason, "[WhatsApp] Missing configuration");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
}

async fn verify_webhook(
    State(state): State<AppState>,
    query: Result<Query<VerifyRequest>, QueryRejection>,
) -> Response {
    let verify_token = match &*state {
        WebhookState::Ready { verify_token, .. } => verify_token,
        WebhookState::Misconfigured(reason) => return configuration_error(reason),
    };

    // An unreadable query string is a failed handshake, not a client error.
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            debug!(error = %rejection, "[WhatsApp] Unreadable verification query");
            VerifyRequest::default()
        }
    };

    let accepted = verify_subscription(&params, verify_token);
    EventLogger::log_event(
        &Uuid::new_v4().to_string(),
        BotEvent::VerificationAttempt {
            mode: params.mode.clone(),
            accepted: accepted.is_some(),
        },
    );

    match accepted {
        Some(challenge) => {
            info!("[WhatsApp] Webhook verified successfully");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            warn!(mode = %params.mode, "[WhatsApp] Webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        }
    }
}

async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let (phone_number_id, sender) = match &*state {
        WebhookState::Ready {
            phone_number_id,
            sender,
            ..
        } => (phone_number_id, sender),
        WebhookState::Misconfigured(reason) => return configuration_error(reason),
    };

    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        WebhookPayload::default()
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => WebhookPayload::from_value(value),
            Err(e) => {
                error!(error = %e, "[WhatsApp] Webhook body is not JSON");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
            }
        }
    };

    let Some(delivery) = payload.extract() else {
        debug!("[WhatsApp] Delivery carried no messages");
        return (StatusCode::OK, Json(json!({ "ok": true, "status": "no_messages" }))).into_response();
    };
    let token = delivery.intent.as_str().to_string();

    if let Some(received) = &delivery.phone_number_id
        && received != phone_number_id
    {
        warn!(
            expected = %phone_number_id,
            %received,
            "[WhatsApp] Delivery addressed to a different phone number id"
        );
    }
    if delivery.dropped > 0 {
        debug!(dropped = delivery.dropped, "[WhatsApp] Only the first message of the batch is answered");
    }

    let request_id = Uuid::new_v4().to_string();
    EventLogger::log_event(
        &request_id,
        BotEvent::InboundMessage {
            from: delivery.from.clone(),
            token: token.clone(),
            dropped: delivery.dropped,
        },
    );

    let reply = route(&token);
    let kind = reply.kind().to_string();
    let to = delivery.from;

    // The send runs in its own task; its outcome only reaches the log.
    let task = {
        let sender = Arc::clone(sender);
        let to = to.clone();
        tokio::spawn(async move { sender.send_reply(&to, &reply).await })
    };
    let failure = match task.await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(e) => Some(format!("send task aborted: {e}")),
    };
    match failure {
        None => {
            EventLogger::log_event(&request_id, BotEvent::ReplyDispatched { to, kind });
        }
        Some(error_msg) => {
            EventLogger::log_event(&request_id, BotEvent::DispatchFailed { to, kind, error_msg });
        }
    }

    (StatusCode::OK, Json(json!({ "ok": true, "message": "Response sent" }))).into_response()
}

async fn method_not_allowed(State(state): State<AppState>) -> Response {
    if let WebhookState::Misconfigured(reason) = &*state {
        return configuration_error(reason);
    }
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
