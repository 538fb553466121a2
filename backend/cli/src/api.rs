use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

/// Shared application state for API handlers.
pub struct AppState {
    /// Whether the WhatsApp credentials resolved at startup.
    pub configured: bool,
}

/// Build the Axum router: health route plus the channel webhook routes.
pub fn build_router(state: Arc<AppState>, whatsapp_router: Router) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
        .merge(whatsapp_router)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "afyabot",
        "version": env!("CARGO_PKG_VERSION"),
        "configured": state.configured,
    }))
}

/// Turn a handler panic into the JSON 500 body the platform expects.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal error".to_string()
    };
    tracing::error!(error = %message, "Handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
}
