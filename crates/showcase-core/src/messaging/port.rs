use async_trait::async_trait;

use crate::{
    domain::{SenderId, SentMessage},
    messaging::types::{OutboundPayload, SessionCapabilities},
    Result,
};

/// Outbound half of a messaging session.
///
/// Telegram is the first implementation; WhatsApp-style transports with native
/// interactive messages fit behind the same interface via capability flags.
#[async_trait]
pub trait SessionPort: Send + Sync {
    fn capabilities(&self) -> SessionCapabilities;

    async fn send(&self, recipient: &SenderId, payload: &OutboundPayload) -> Result<SentMessage>;
}
