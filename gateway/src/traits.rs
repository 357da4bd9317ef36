use async_trait::async_trait;
use api_types::{AttachmentObject, MessageObject};

use crate::GatewayError;

/// Minimal capability interface the gateway needs from persistence.
///
/// Kept as a trait (rather than a direct dependency on `core::Store`) so
/// `gateway` has no dependency on `core`: `core` depends on `gateway` and
/// implements this for its own `Store`, avoiding the cyclic-dependency
/// shape a concrete `WebSocketManager` would otherwise force.
#[async_trait]
pub trait GatewayStore: Send + Sync {
    /// Resolves a Discord channel id to whether we track that channel at
    /// all; untracked channels are ignored.
    async fn is_channel_tracked(&self, discord_channel_id: &str) -> Result<bool, GatewayError>;

    /// Upserts a message (and its attachments) dispatched via
    /// `MESSAGE_CREATE`, returning the stored wire shape for broadcast.
    async fn upsert_dispatched_message(
        &self,
        message: &MessageObject,
    ) -> Result<MessageObject, GatewayError>;

    /// Applies a `MESSAGE_UPDATE`: content and edited_timestamp only.
    /// Returns `None` if the message isn't tracked.
    async fn apply_message_update(
        &self,
        discord_message_id: &str,
        content: Option<&str>,
        edited_timestamp: Option<&str>,
    ) -> Result<Option<MessageObject>, GatewayError>;

    /// Deletes a message by discord id, returning the pre-delete snapshot
    /// for broadcast. `None` if it wasn't tracked.
    async fn delete_dispatched_message(
        &self,
        discord_message_id: &str,
    ) -> Result<Option<MessageObject>, GatewayError>;

    async fn persist_attachment(
        &self,
        discord_message_id: &str,
        attachment: &AttachmentObject,
    ) -> Result<(), GatewayError>;

    /// Persists gateway session bookkeeping from `READY` (session id,
    /// gateway url, sequence) and heartbeat/status transitions.
    async fn record_gateway_session(
        &self,
        user_id: i64,
        session_id: &str,
        gateway_url: &str,
    ) -> Result<(), GatewayError>;

    async fn update_gateway_status(
        &self,
        user_id: i64,
        status: GatewaySessionStatus,
        last_sequence: Option<i64>,
    ) -> Result<(), GatewayError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewaySessionStatus {
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

/// Minimal capability interface for obtaining a usable (decrypted,
/// refreshed-if-needed) user access token, without exposing `Crypto` or
/// `Store` directly to the gateway crate.
#[async_trait]
pub trait GatewayAuth: Send + Sync {
    async fn access_token_for_user(&self, user_id: i64) -> Result<String, GatewayError>;
}
