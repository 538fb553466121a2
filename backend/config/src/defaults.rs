//! Default values for optional settings.

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

/// Route the webhook is mounted on.
pub const DEFAULT_WEBHOOK_PATH: &str = "/api/whatsapp/webhook";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Graph API version used in the outbound send URL.
pub const DEFAULT_API_VERSION: &str = "v19.0";

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com";

/// Per-request timeout for the outbound send call.
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;
