use async_tungstenite::tungstenite::protocol::CloseFrame;
use async_tungstenite::tungstenite::Error as TungsteniteError;
use thiserror::Error;

/// Errors the gateway layer distinguishes internally, the
/// `GatewayProtocolError` family expanded for implementation detail.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] TungsteniteError),

    #[error("gateway closed: {0}")]
    Closed(String),

    #[error("failed to decode gateway frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not obtain a usable access token for this connection: {0}")]
    Auth(String),

    #[error("persisting dispatched data failed: {0}")]
    Store(String),

    #[error("user already has an active gateway connection")]
    LimitExceeded,

    #[error("connect attempted on a non-idle connection")]
    NotIdle,
}

pub(crate) fn close_reason(frame: &Option<CloseFrame<'static>>) -> String {
    frame
        .as_ref()
        .map(|f| format!("{} ({})", f.code, f.reason))
        .unwrap_or_else(|| "no close frame".to_owned())
}

pub type Result<T> = core::result::Result<T, GatewayError>;
