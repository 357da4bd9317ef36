use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use api_types::GatewayIntentBits;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::connection::{GatewayConnection, GatewayEventSink};
use crate::event::StreamEvent;
use crate::traits::{GatewayAuth, GatewayStore};
use crate::{GatewayError, Result};

/// Bounded capacity of each per-subscriber fan-out buffer. A slow
/// subscriber drops events rather than back-pressuring the connection
/// that dispatched them.
const SUBSCRIBER_BUFFER: usize = 100;

/// Default staleness threshold for [`GatewayManager::cleanup_stale_connections`]
/// when driven by [`GatewayManager::spawn_cleanup_ticker`] without an
/// explicit override: a connection whose last heartbeat ack is older than
/// this is closed and removed even if its task hasn't exited on its own.
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(120);

struct ConnectionHandle {
    task: JoinHandle<()>,
    last_ack: Arc<AtomicI64>,
}

struct Subscriber {
    id: u64,
    sender: AsyncSender<StreamEvent>,
}

/// A live subscription handed back to the caller of
/// [`GatewayManager::subscribe`]; drop or call [`GatewayManager::unsubscribe`]
/// (once per channel) to remove it.
pub struct Subscription {
    pub id: u64,
    pub channel_discord_ids: Vec<String>,
    pub receiver: AsyncReceiver<StreamEvent>,
}

/// Owns one [`GatewayConnection`] per authenticated user and fans dispatched
/// message events out to whichever channels have active subscribers.
///
/// Despecialized from a per-shard, single-bot-token model to one connection
/// per user: each `ensure_connection` call either finds a live connection or
/// spawns a fresh one in a detached task, mirroring the shard worker's
/// spawn-and-forget shape but without shard ids or a shared bot bucket.
pub struct GatewayManager {
    gateway_url: String,
    intents: GatewayIntentBits,
    store: Arc<dyn GatewayStore>,
    auth: Arc<dyn GatewayAuth>,
    connections: RwLock<HashMap<i64, ConnectionHandle>>,
    subscriptions: RwLock<HashMap<String, Vec<Subscriber>>>,
    next_subscriber_id: AtomicU64,
}

impl GatewayManager {
    pub fn new(
        gateway_url: String,
        intents: GatewayIntentBits,
        store: Arc<dyn GatewayStore>,
        auth: Arc<dyn GatewayAuth>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway_url,
            intents,
            store,
            auth,
            connections: RwLock::new(HashMap::new()),
            subscriptions: RwLock::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(0),
        })
    }

    /// Registers a new subscriber across every listed Discord channel id,
    /// sharing ONE bounded buffer (capacity [`SUBSCRIBER_BUFFER`]) for the
    /// whole set rather than one per channel, so a user subscribed to many
    /// channels still only ever backs up 100 events total. Events are
    /// delivered best-effort: a full buffer drops the event rather than
    /// blocking the dispatching connection.
    pub async fn subscribe(&self, channel_discord_ids: &[String]) -> Subscription {
        let (sender, receiver) = kanal::bounded_async(SUBSCRIBER_BUFFER);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);

        let mut subscriptions = self.subscriptions.write().await;
        for channel_discord_id in channel_discord_ids {
            subscriptions
                .entry(channel_discord_id.clone())
                .or_default()
                .push(Subscriber {
                    id,
                    sender: sender.clone(),
                });
        }
        drop(subscriptions);

        Subscription {
            id,
            channel_discord_ids: channel_discord_ids.to_vec(),
            receiver,
        }
    }

    pub async fn unsubscribe(&self, channel_discord_id: &str, subscriber_id: u64) {
        let mut subscriptions = self.subscriptions.write().await;
        if let Some(subscribers) = subscriptions.get_mut(channel_discord_id) {
            subscribers.retain(|s| s.id != subscriber_id);
            if subscribers.is_empty() {
                subscriptions.remove(channel_discord_id);
            }
        }
    }

    /// Ensures a gateway connection exists for `user_id`, creating one
    /// and running it in a detached task if none is live. If the task
    /// ever returns, its entry is removed so a later call can retry.
    pub async fn ensure_connection(self: &Arc<Self>, user_id: i64) -> Result<()> {
        if self.has_live_connection(user_id).await {
            return Ok(());
        }

        let mut connections = self.connections.write().await;
        if connections
            .get(&user_id)
            .is_some_and(|handle| !handle.task.is_finished())
        {
            return Ok(());
        }

        let access_token = self
            .auth
            .access_token_for_user(user_id)
            .await
            .map_err(|_| GatewayError::Auth(format!("no usable access token for user {user_id}")))?;

        let connection = GatewayConnection::new(
            user_id,
            self.gateway_url.clone(),
            self.intents,
            access_token,
            self.store.clone(),
            self.clone() as Arc<dyn GatewayEventSink>,
        );
        let last_ack = connection.last_ack_handle();

        let manager = self.clone();
        let mut connection = connection;
        let task = tokio::spawn(async move {
            if let Err(err) = connection.connect().await {
                warn!(user_id, %err, "gateway dial failed");
            }
            manager.connections.write().await.remove(&user_id);
        });

        connections.insert(user_id, ConnectionHandle { task, last_ack });
        Ok(())
    }

    async fn has_live_connection(&self, user_id: i64) -> bool {
        self.connections
            .read()
            .await
            .get(&user_id)
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Aborts every live connection and drops all subscriptions.
    pub async fn shutdown(&self) {
        let mut connections = self.connections.write().await;
        for (_, handle) in connections.drain() {
            handle.task.abort();
        }
        self.subscriptions.write().await.clear();
    }

    /// Closes and removes connections whose task has already ended, and
    /// those whose last heartbeat ack is older than `max_age` even if
    /// their task is technically still running (a socket wedged without
    /// erroring out). Run on a ticker by the caller, or via
    /// [`Self::spawn_cleanup_ticker`].
    pub async fn cleanup_stale_connections(&self, max_age: Duration) {
        let mut connections = self.connections.write().await;
        let before = connections.len();

        connections.retain(|user_id, handle| {
            if handle.task.is_finished() {
                return false;
            }
            if crate::connection::is_stale(&handle.last_ack, max_age) {
                debug!(user_id, "aborting stale gateway connection");
                handle.task.abort();
                return false;
            }
            true
        });

        let removed = before - connections.len();
        if removed > 0 {
            debug!(removed, "reaped stale/finished gateway connections");
        }
    }

    /// Runs [`Self::cleanup_stale_connections`] on a fixed interval
    /// against [`DEFAULT_STALE_AFTER`] until the returned handle is
    /// dropped or aborted.
    pub fn spawn_cleanup_ticker(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        self.spawn_cleanup_ticker_with(interval, DEFAULT_STALE_AFTER)
    }

    /// Same as [`Self::spawn_cleanup_ticker`] with an explicit staleness
    /// threshold, for callers whose configuration overrides the default.
    pub fn spawn_cleanup_ticker_with(self: &Arc<Self>, interval: Duration, stale_after: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                manager.cleanup_stale_connections(stale_after).await;
            }
        })
    }
}

#[async_trait]
impl GatewayEventSink for GatewayManager {
    async fn broadcast(&self, channel_discord_id: &str, event: StreamEvent) {
        let subscriptions = self.subscriptions.read().await;
        let Some(subscribers) = subscriptions.get(channel_discord_id) else {
            return;
        };
        for subscriber in subscribers {
            let _ = subscriber.sender.try_send(event.clone());
        }
    }

    async fn debug(&self, user_id: i64, message: String) {
        debug!(user_id, message);
    }

    async fn connection_error(&self, user_id: i64, error: &GatewayError) {
        warn!(user_id, %error, "gateway connection error");
    }
}
