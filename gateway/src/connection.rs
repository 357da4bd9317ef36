use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use api_types::{
    DispatchPayload, GatewayIntentBits, GatewayReceivePayload, GatewaySendPayload, IdentifyData,
    MessageDeleteData, MessageObject,
};
use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use crate::event::{EventType, StreamEvent};
use crate::traits::{GatewaySessionStatus, GatewayStore};
use crate::websocket::{WebSocket, WebSocketExt};
use crate::{GatewayError, Result};

/// Minimum/maximum jittered back-off before re-identifying after an
/// unresumable `INVALID_SESSION` (see DESIGN.md: re-identify fresh rather
/// than blindly resuming across a process restart).
const REIDENTIFY_MIN_DELAY: Duration = Duration::from_secs(1);
const REIDENTIFY_MAX_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Init,
    HelloWait,
    Identifying,
    Connected,
    Disconnected,
    Closed,
}

struct Session {
    session_id: String,
}

/// Per-user handle to Discord's Gateway WebSocket. One instance per
/// authenticated user, owned and driven by [`crate::GatewayManager`].
pub struct GatewayConnection {
    user_id: i64,
    gateway_url: String,
    intents: GatewayIntentBits,
    access_token: String,

    store: Arc<dyn GatewayStore>,
    sink: Arc<dyn GatewayEventSink>,

    state: ConnectionState,
    session: Option<Session>,
    last_sequence: Option<i64>,
    heartbeat_interval: Option<Duration>,
    last_ack_millis: Arc<AtomicI64>,
    last_heartbeat_sent_at: std::time::Instant,
}

/// Broadcast + debug surface a connection reports into. Implemented by
/// [`crate::GatewayManager`] so `GatewayConnection` never sees the
/// subscription map directly.
#[async_trait::async_trait]
pub trait GatewayEventSink: Send + Sync {
    async fn broadcast(&self, channel_discord_id: &str, event: StreamEvent);
    async fn debug(&self, _user_id: i64, _message: String) {}
    async fn connection_error(&self, _user_id: i64, _error: &GatewayError) {}
}

impl GatewayConnection {
    pub fn new(
        user_id: i64,
        gateway_url: String,
        intents: GatewayIntentBits,
        access_token: String,
        store: Arc<dyn GatewayStore>,
        sink: Arc<dyn GatewayEventSink>,
    ) -> Self {
        Self {
            user_id,
            gateway_url,
            intents,
            access_token,
            store,
            sink,
            state: ConnectionState::Init,
            session: None,
            last_sequence: None,
            heartbeat_interval: None,
            last_ack_millis: Arc::new(AtomicI64::new(Utc::now().timestamp_millis())),
            last_heartbeat_sent_at: std::time::Instant::now(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// A shared handle onto this connection's last-heartbeat-ack time,
    /// clonable before the connection is moved into its driving task so
    /// an owner (the manager) can still check liveness from outside.
    pub fn last_ack_handle(&self) -> Arc<AtomicI64> {
        self.last_ack_millis.clone()
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        is_stale(&self.last_ack_millis, max_age)
    }

    /// Dials, runs the opcode state machine to completion, and returns.
    /// Only a dial failure is propagated as `Err`; every subsequent error
    /// is logged and ends the connection, and this returns `Ok(())` so the
    /// manager can reap the entry.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state != ConnectionState::Init && self.state != ConnectionState::Disconnected {
            return Err(GatewayError::NotIdle);
        }

        let mut socket = WebSocket::create(&self.gateway_url).await?;
        self.state = ConnectionState::HelloWait;

        loop {
            match self.drive(&mut socket).await {
                Ok(Some(next_socket)) => {
                    socket = next_socket;
                    self.state = ConnectionState::HelloWait;
                }
                Ok(None) => break,
                Err(err) => {
                    self.sink.connection_error(self.user_id, &err).await;
                    break;
                }
            }
        }

        self.state = ConnectionState::Closed;
        self.update_status(GatewaySessionStatus::Disconnected).await;
        Ok(())
    }

    /// Runs until the connection needs a fresh socket (reconnect / fresh
    /// identify) or ends for good. `Ok(Some(socket))` means "keep going
    /// with this new socket"; `Ok(None)` means "done".
    async fn drive(&mut self, socket: &mut WebSocket) -> Result<Option<WebSocket>> {
        loop {
            if let Some(interval) = self.heartbeat_interval {
                if self.last_heartbeat_sent_at.elapsed() >= interval {
                    self.send_heartbeat(socket).await?;
                }
            }

            let frame = match socket.recv_next().await {
                Ok(frame) => frame,
                Err(GatewayError::Closed(reason)) => {
                    warn!(user_id = self.user_id, reason, "gateway connection closed");
                    self.state = ConnectionState::Disconnected;
                    return Ok(None);
                }
                Err(err) => return Err(err),
            };

            let Some(frame) = frame else { continue };

            match self.handle_frame(frame).await? {
                FrameOutcome::Continue => {}
                FrameOutcome::HeartbeatNow => self.send_heartbeat(socket).await?,
                FrameOutcome::Identify => self.identify(socket).await?,
                FrameOutcome::Reconnect => {
                    let fresh = WebSocket::create(&self.gateway_url).await?;
                    return Ok(Some(fresh));
                }
                FrameOutcome::ReidentifyFresh => {
                    self.session = None;
                    let delay = jittered_delay();
                    debug!(user_id = self.user_id, ?delay, "invalid session, re-identifying after back-off");
                    tokio::time::sleep(delay).await;
                    let fresh = WebSocket::create(&self.gateway_url).await?;
                    return Ok(Some(fresh));
                }
            }
        }
    }

    async fn handle_frame(&mut self, frame: GatewayReceivePayload) -> Result<FrameOutcome> {
        if let Some(seq) = frame_sequence(&frame) {
            self.last_sequence = Some(self.last_sequence.map_or(seq, |s| s.max(seq)));
        }

        match frame {
            GatewayReceivePayload::Hello(interval_ms) => {
                self.heartbeat_interval = Some(Duration::from_millis(interval_ms));
                self.state = ConnectionState::Identifying;
                Ok(FrameOutcome::Identify)
            }
            GatewayReceivePayload::HeartbeatRequest => Ok(FrameOutcome::HeartbeatNow),
            GatewayReceivePayload::HeartbeatAck => {
                self.last_ack_millis
                    .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
                Ok(FrameOutcome::Continue)
            }
            GatewayReceivePayload::InvalidSession(_resumable) => {
                // Always re-identify fresh rather than attempting a RESUME,
                // regardless of the resumable flag: this process doesn't
                // persist the Discord session id/sequence anywhere a
                // restarted connection could recover them from.
                Ok(FrameOutcome::ReidentifyFresh)
            }
            GatewayReceivePayload::Reconnect => Ok(FrameOutcome::Reconnect),
            GatewayReceivePayload::Dispatch((_, payload)) => {
                self.handle_dispatch(payload).await?;
                Ok(FrameOutcome::Continue)
            }
            GatewayReceivePayload::UnknownOp(op, _) => {
                debug!(user_id = self.user_id, op, "ignoring unknown gateway opcode");
                Ok(FrameOutcome::Continue)
            }
        }
    }

    async fn identify(&mut self, socket: &mut WebSocket) -> Result<()> {
        let data = IdentifyData {
            token: self.access_token.clone(),
            intents: self.intents.bits(),
            ..Default::default()
        };
        socket.send_op(GatewaySendPayload::Identify(data)).await?;
        self.update_status(GatewaySessionStatus::Connecting).await;
        Ok(())
    }

    async fn send_heartbeat(&mut self, socket: &mut WebSocket) -> Result<()> {
        socket
            .send_op(GatewaySendPayload::Heartbeat(
                self.last_sequence.map(|s| s as u64),
            ))
            .await?;
        self.last_heartbeat_sent_at = std::time::Instant::now();
        Ok(())
    }

    async fn handle_dispatch(&mut self, payload: DispatchPayload) -> Result<()> {
        match payload {
            DispatchPayload::Ready(data) => {
                self.session = Some(Session {
                    session_id: data.session_id.clone(),
                });
                self.state = ConnectionState::Connected;
                self.store
                    .record_gateway_session(self.user_id, &data.session_id, &self.gateway_url)
                    .await
                    .map_err(|e| GatewayError::Store(e.to_string()))?;
                self.update_status(GatewaySessionStatus::Connected).await;
                self.sink
                    .debug(self.user_id, format!("gateway ready: session {}", data.session_id))
                    .await;
            }
            DispatchPayload::MessageCreate(raw) => self.on_message_create(raw).await?,
            DispatchPayload::MessageUpdate(raw) => self.on_message_update(raw).await?,
            DispatchPayload::MessageDelete(raw) => self.on_message_delete(raw).await?,
            _ => {}
        }
        Ok(())
    }

    /// MESSAGE_CREATE: ignore untracked channels, persist, broadcast.
    async fn on_message_create(&self, raw: serde_json::Map<String, serde_json::Value>) -> Result<()> {
        let message: MessageObject = serde_json::from_value(serde_json::Value::Object(raw))?;

        if !self
            .store
            .is_channel_tracked(&message.channel_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?
        {
            return Ok(());
        }

        let stored = self
            .store
            .upsert_dispatched_message(&message)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        for attachment in &message.attachments {
            self.store
                .persist_attachment(&message.id, attachment)
                .await
                .map_err(|e| GatewayError::Store(e.to_string()))?;
        }

        self.sink
            .broadcast(
                &message.channel_id,
                StreamEvent {
                    event_type: EventType::Create,
                    message: stored,
                    timestamp_ms: Utc::now().timestamp_millis(),
                },
            )
            .await;

        Ok(())
    }

    async fn on_message_update(&self, raw: serde_json::Map<String, serde_json::Value>) -> Result<()> {
        let message: MessageObject = serde_json::from_value(serde_json::Value::Object(raw))?;

        let Some(updated) = self
            .store
            .apply_message_update(
                &message.id,
                message.content.as_deref(),
                message.edited_timestamp.as_deref(),
            )
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?
        else {
            return Ok(());
        };

        self.sink
            .broadcast(
                &message.channel_id,
                StreamEvent {
                    event_type: EventType::Update,
                    message: updated,
                    timestamp_ms: Utc::now().timestamp_millis(),
                },
            )
            .await;

        Ok(())
    }

    async fn on_message_delete(&self, raw: serde_json::Map<String, serde_json::Value>) -> Result<()> {
        let data: MessageDeleteData = serde_json::from_value(serde_json::Value::Object(raw))?;

        let Some(snapshot) = self
            .store
            .delete_dispatched_message(&data.id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?
        else {
            return Ok(());
        };

        self.sink
            .broadcast(
                &data.channel_id,
                StreamEvent {
                    event_type: EventType::Delete,
                    message: snapshot,
                    timestamp_ms: Utc::now().timestamp_millis(),
                },
            )
            .await;

        Ok(())
    }

    async fn update_status(&self, status: GatewaySessionStatus) {
        let _ = self
            .store
            .update_gateway_status(self.user_id, status, self.last_sequence)
            .await;
    }
}

enum FrameOutcome {
    Continue,
    HeartbeatNow,
    Identify,
    Reconnect,
    ReidentifyFresh,
}

fn frame_sequence(frame: &GatewayReceivePayload) -> Option<i64> {
    match frame {
        GatewayReceivePayload::Dispatch((s, _)) => Some(*s),
        _ => None,
    }
}

/// Shared by [`GatewayConnection::is_stale`] and the manager's external
/// staleness check against a cloned handle.
pub(crate) fn is_stale(last_ack_millis: &AtomicI64, max_age: Duration) -> bool {
    let last_ack = last_ack_millis.load(Ordering::Relaxed);
    let age_ms = Utc::now().timestamp_millis() - last_ack;
    age_ms > max_age.as_millis() as i64
}

fn jittered_delay() -> Duration {
    let min = REIDENTIFY_MIN_DELAY.as_millis() as u64;
    let max = REIDENTIFY_MAX_DELAY.as_millis() as u64;
    Duration::from_millis(rand::thread_rng().gen_range(min..=max))
}
