use async_trait::async_trait;
use async_tungstenite::{
    tokio::{connect_async, ConnectStream},
    tungstenite::Message,
    WebSocketStream,
};
use futures::{SinkExt, StreamExt};
use api_types::{GatewayReceivePayload, GatewaySendPayload};
use tokio::time::{timeout, Duration};

use crate::error::close_reason;
use crate::{GatewayError, Result};

pub type WebSocket = WebSocketStream<ConnectStream>;

#[async_trait]
pub trait WebSocketExt {
    async fn create(url: &str) -> Result<WebSocket> {
        let (ws_stream, _) = connect_async(url).await?;
        Ok(ws_stream)
    }

    async fn recv_next(&mut self) -> Result<Option<GatewayReceivePayload>>;

    async fn send_op(&mut self, op: GatewaySendPayload) -> Result<()>;
}

#[async_trait]
impl WebSocketExt for WebSocket {
    async fn recv_next(&mut self) -> Result<Option<GatewayReceivePayload>> {
        const POLL_TIMEOUT: Duration = Duration::from_millis(500);

        match timeout(POLL_TIMEOUT, self.next()).await {
            Ok(Some(Ok(message))) => Ok(get_text(message)?.map(GatewayReceivePayload::unpack)),
            Ok(Some(Err(err))) => Err(GatewayError::Transport(err)),
            Ok(None) | Err(_) => Ok(None),
        }
    }

    async fn send_op(&mut self, op: GatewaySendPayload) -> Result<()> {
        let text = serde_json::to_string(&op)?;
        self.send(Message::Text(text)).await?;
        Ok(())
    }
}

fn get_text(msg: Message) -> Result<Option<String>> {
    match msg {
        Message::Text(txt) => Ok(Some(txt)),
        Message::Close(frame) => Err(GatewayError::Closed(close_reason(&frame))),
        _ => Ok(None),
    }
}
