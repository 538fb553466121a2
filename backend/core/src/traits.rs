use async_trait::async_trait;

use crate::error::AfyaError;
use crate::reply::ReplySpec;

/// Outbound side of a messaging channel.
///
/// Implementations deliver one reply to one recipient and report failure; they
/// never retry.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, to: &str, reply: &ReplySpec) -> Result<(), AfyaError>;
}
