use async_trait::async_trait;

pub mod wa_send;
pub mod wa_types;
pub mod whatsapp;

pub use wa_send::{GraphApiClient, PayloadIssue, lint_reply, render_payload};
pub use wa_types::{InboundDelivery, WebhookPayload};
pub use whatsapp::{WhatsAppAdapter, verify_subscription};

/// All channel adapters implement this trait.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Build the Axum sub-router for inbound webhook endpoints.
    fn build_router(&self) -> axum::Router {
        axum::Router::new()
    }

    /// Start the adapter's background work, if any.
    async fn start(&self) -> anyhow::Result<()>;
}
