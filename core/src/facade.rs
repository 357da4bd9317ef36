use std::sync::Arc;

use api_types::{ChannelObject, GuildObject, MessageObject};
use chrono::Utc;
use gateway::{GatewayManager, StreamEvent};
use kanal::AsyncReceiver;
use rest::DiscordClient;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cache_manager::CacheManager;
use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::models::{AuthSessionStatus, CacheKind, Channel, Guild, User};
use crate::oauth_orchestrator::OAuthOrchestrator;
use crate::state_manager::StateManager;
use crate::store::Store;
use crate::token_service::TokenService;

/// Adapts the five public operations onto calls into the
/// components below. Stateless itself: every method takes a `session_id`
/// and resolves authorization fresh each call rather than caching a
/// decision across calls.
pub struct RpcFacade {
    store: Store,
    discord: Arc<DiscordClient>,
    state_manager: Arc<StateManager>,
    oauth: Arc<OAuthOrchestrator>,
    cache: Arc<CacheManager>,
    tokens: Arc<TokenService>,
    gateway: Option<Arc<GatewayManager>>,
    session_expiry_hours: i64,
}

pub struct AuthenticatedUser {
    pub discord_id: String,
    pub username: String,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            discord_id: user.discord_id,
            username: user.username,
            discriminator: user.discriminator,
            avatar: user.avatar,
            email: user.email,
        }
    }
}

pub enum AuthStatus {
    Pending,
    Authenticated(AuthenticatedUser),
    Failed { reason: String },
}

pub struct InitAuthResponse {
    pub auth_url: String,
    pub session_id: String,
    pub state: String,
}

pub struct GuildsResponse {
    pub guilds: Vec<GuildObject>,
    pub from_cache: bool,
}

pub struct ChannelsResponse {
    pub channels: Vec<ChannelObject>,
    pub from_cache: bool,
}

pub struct MessagesResponse {
    pub messages: Vec<MessageObject>,
    pub from_cache: bool,
}

impl RpcFacade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Store,
        discord: Arc<DiscordClient>,
        state_manager: Arc<StateManager>,
        oauth: Arc<OAuthOrchestrator>,
        cache: Arc<CacheManager>,
        tokens: Arc<TokenService>,
        gateway: Option<Arc<GatewayManager>>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            discord,
            state_manager,
            oauth,
            cache,
            tokens,
            gateway,
            session_expiry_hours: config.security.session_expiry_hours,
        }
    }

    /// `InitAuth`: generate a fresh session id if none was supplied,
    /// issue and store a CSRF state token, and create the pending session.
    pub async fn init_auth(&self, session_id: Option<String>) -> Result<InitAuthResponse> {
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let state = StateManager::generate_state();

        self.state_manager.store_state(&state, &session_id).await?;

        let expires_at = Utc::now() + chrono::Duration::hours(self.session_expiry_hours);
        self.store.create_auth_session(&session_id, expires_at).await?;

        Ok(InitAuthResponse {
            auth_url: self.discord.get_auth_url(&state),
            session_id,
            state,
        })
    }

    /// Exposed so an external HTTP handler (out of scope here) can drive
    /// `OAuthOrchestrator` through the facade rather than reaching past it.
    pub async fn handle_oauth_callback(&self, code: &str, state: &str) -> Result<i64> {
        self.oauth.handle_callback(code, state).await
    }

    /// `GetAuthStatus`: reports at most three terminal states. An
    /// expired session reports FAILED without being deleted.
    pub async fn get_auth_status(&self, session_id: &str) -> Result<AuthStatus> {
        let session = self
            .store
            .get_auth_session(session_id)
            .await?
            .ok_or(CoreError::Unauthenticated)?;

        if session.is_expired() {
            return Ok(AuthStatus::Failed {
                reason: "session has expired".into(),
            });
        }

        match session.status {
            AuthSessionStatus::Pending => Ok(AuthStatus::Pending),
            AuthSessionStatus::Failed => Ok(AuthStatus::Failed {
                reason: session.error.unwrap_or_else(|| "unknown error".into()),
            }),
            AuthSessionStatus::Authenticated => {
                let user_id = session
                    .user_id
                    .ok_or_else(|| CoreError::Internal("authenticated session missing user_id".into()))?;
                let user = self
                    .store
                    .get_user(user_id)
                    .await?
                    .ok_or_else(|| CoreError::NotFound(format!("user {user_id}")))?;
                Ok(AuthStatus::Authenticated(user.into()))
            }
        }
    }

    /// `RevokeAuth`: deletes the token (if any) then the session.
    pub async fn revoke_auth(&self, session_id: &str) -> Result<bool> {
        let session = self
            .store
            .get_auth_session(session_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("auth session {session_id}")))?;

        if let Some(user_id) = session.user_id {
            self.store.delete_oauth_token(user_id).await?;
        }
        self.store.delete_auth_session(session_id).await?;
        Ok(true)
    }

    /// `GetGuilds`: read-through over the guild-list cache.
    pub async fn get_guilds(&self, session_id: &str, force_refresh: bool) -> Result<GuildsResponse> {
        let user_id = self.require_authenticated(session_id).await?;

        if !force_refresh && self.cache.check(CacheKind::Guild, &user_id.to_string(), Some(user_id)).await? {
            let rows = self.store.list_user_guilds(user_id).await?;
            return Ok(GuildsResponse {
                guilds: rows.into_iter().map(guild_row_to_wire).collect(),
                from_cache: true,
            });
        }

        let (access_token, _) = self.tokens.access_token_for_user(user_id).await?;
        let upstream = self
            .discord
            .get_user_guilds(&access_token)
            .await
            .map_err(CoreError::from)?;

        let mut rows = Vec::with_capacity(upstream.len());
        for guild in &upstream {
            let row = self.store.create_or_update_guild(guild).await?;
            self.store.create_user_guild(user_id, row.id).await?;
            rows.push(row);
        }

        self.cache.set(CacheKind::Guild, &user_id.to_string(), Some(user_id)).await?;

        Ok(GuildsResponse {
            guilds: rows.into_iter().map(guild_row_to_wire).collect(),
            from_cache: false,
        })
    }

    /// `GetChannels`: read-through, scoped per-guild.
    pub async fn get_channels(
        &self,
        session_id: &str,
        guild_discord_id: &str,
        force_refresh: bool,
    ) -> Result<ChannelsResponse> {
        let user_id = self.require_authenticated(session_id).await?;

        if !self.store.user_has_guild_access(user_id, guild_discord_id).await? {
            return Err(CoreError::PermissionDenied(format!(
                "user has no access to guild {guild_discord_id}"
            )));
        }

        let guild = self
            .store
            .get_guild_by_discord_id(guild_discord_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("guild {guild_discord_id}")))?;

        if !force_refresh && self.cache.check(CacheKind::Channel, guild_discord_id, Some(user_id)).await? {
            let rows = self.store.list_guild_channels(guild.id).await?;
            return Ok(ChannelsResponse {
                channels: rows.into_iter().map(channel_row_to_wire).collect(),
                from_cache: true,
            });
        }

        // Channel listing is bot-scoped, no user access token involved.
        let upstream = self
            .discord
            .get_guild_channels(guild_discord_id)
            .await
            .map_err(CoreError::from)?;

        let mut rows = Vec::with_capacity(upstream.len());
        for channel in &upstream {
            rows.push(self.store.create_or_update_channel(guild.id, channel).await?);
        }

        self.cache.set(CacheKind::Channel, guild_discord_id, Some(user_id)).await?;

        Ok(ChannelsResponse {
            channels: rows.into_iter().map(channel_row_to_wire).collect(),
            from_cache: false,
        })
    }

    /// `GetMessages`: read-through; pagination bypasses the cache
    /// entirely and never refreshes cache metadata.
    pub async fn get_messages(
        &self,
        session_id: &str,
        channel_discord_id: &str,
        limit: Option<u32>,
        before: Option<&str>,
        after: Option<&str>,
        force_refresh: bool,
    ) -> Result<MessagesResponse> {
        let user_id = self.require_authenticated(session_id).await?;

        if !self.store.user_has_channel_access(user_id, channel_discord_id).await? {
            return Err(CoreError::PermissionDenied(format!(
                "user has no access to channel {channel_discord_id}"
            )));
        }

        let channel = self
            .store
            .get_channel_by_discord_id(channel_discord_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("channel {channel_discord_id}")))?;

        let is_paginated = before.is_some_and(|b| !b.is_empty()) || after.is_some_and(|a| !a.is_empty());

        if !is_paginated
            && !force_refresh
            && self.cache.check(CacheKind::Message, channel_discord_id, Some(user_id)).await?
        {
            let rows = self
                .store
                .get_messages_by_channel_id(channel.id, limit, None, None)
                .await?;
            let mut messages = Vec::with_capacity(rows.len());
            for row in &rows {
                messages.push(self.store.message_to_wire(row).await?);
            }
            return Ok(MessagesResponse { messages, from_cache: true });
        }

        let (access_token, _) = self.tokens.access_token_for_user(user_id).await?;
        let upstream = self
            .discord
            .get_channel_messages(&access_token, channel_discord_id, limit, before, after)
            .await
            .map_err(CoreError::from)?;

        let mut messages = Vec::with_capacity(upstream.len());
        for message in &upstream {
            let row = self.store.create_or_update_message(channel.id, message).await?;
            for attachment in &message.attachments {
                self.store.upsert_message_attachment(row.id, attachment).await?;
            }
            messages.push(message.clone());
        }

        if !is_paginated {
            self.cache.set(CacheKind::Message, channel_discord_id, Some(user_id)).await?;
        }

        Ok(MessagesResponse { messages, from_cache: false })
    }

    /// `StreamMessages`: validates access to every requested channel
    /// before subscribing to any of them, so a single bad channel id never
    /// leaves a partial subscription behind.
    pub async fn stream_messages(&self, session_id: &str, channel_discord_ids: &[String]) -> Result<MessageStream> {
        let user_id = self.require_authenticated(session_id).await?;

        let Some(manager) = self.gateway.clone() else {
            return Err(CoreError::Unavailable("websocket support is disabled".into()));
        };

        for channel_id in channel_discord_ids {
            if !self.store.user_has_channel_access(user_id, channel_id).await? {
                return Err(CoreError::PermissionDenied(format!("no access to channel {channel_id}")));
            }
        }

        manager.ensure_connection(user_id).await.map_err(CoreError::from)?;

        // One shared buffer (§4.9) for the whole requested channel set,
        // not one per channel: `GatewayManager::subscribe` registers the
        // same sender under every listed channel.
        let subscription = manager.subscribe(channel_discord_ids).await;

        Ok(MessageStream {
            receiver: subscription.receiver,
            subscriber_id: subscription.id,
            channel_discord_ids: subscription.channel_discord_ids,
            manager,
            cancel_token: CancellationToken::new(),
        })
    }

    /// Resolves a `session_id` to its authenticated user: empty/unknown
    /// session is `Unauthenticated`, and so is an expired or
    /// non-authenticated one (except `GetAuthStatus`, which has its own
    /// handling above).
    async fn require_authenticated(&self, session_id: &str) -> Result<i64> {
        if session_id.is_empty() {
            return Err(CoreError::Unauthenticated);
        }

        let session = self
            .store
            .get_auth_session(session_id)
            .await?
            .ok_or(CoreError::Unauthenticated)?;

        if session.is_expired() || session.status != AuthSessionStatus::Authenticated {
            return Err(CoreError::Unauthenticated);
        }

        session.user_id.ok_or(CoreError::Unauthenticated)
    }
}

/// A live, possibly multi-channel subscription handed back by
/// [`RpcFacade::stream_messages`]. Backed directly by the single shared
/// [`gateway::Subscription`] buffer `subscribe` hands back for the whole
/// requested channel set.
pub struct MessageStream {
    receiver: AsyncReceiver<StreamEvent>,
    subscriber_id: u64,
    channel_discord_ids: Vec<String>,
    manager: Arc<GatewayManager>,
    cancel_token: CancellationToken,
}

impl MessageStream {
    /// Per §4.10: on context cancellation this resolves to
    /// `Err(CoreError::Canceled)` instead of waiting for the next event.
    /// The embedding transport should call [`Self::cancellation_token`]'s
    /// `cancel()` when it observes the RPC context being canceled.
    pub async fn recv(&mut self) -> Result<Option<StreamEvent>> {
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(CoreError::Canceled),
            event = self.receiver.recv() => Ok(event.ok()),
        }
    }

    /// A handle the embedding transport can cancel to end this stream
    /// (e.g. when it detects the RPC's context has been canceled).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Unsubscribes every channel this stream was subscribed to. Called
    /// automatically on drop (covering abrupt client disconnection, where
    /// the only signal available is the stream being dropped); callers
    /// that can await termination may call this directly instead.
    pub async fn close(mut self) {
        self.unsubscribe_all().await;
    }

    async fn unsubscribe_all(&mut self) {
        let channel_discord_ids = std::mem::take(&mut self.channel_discord_ids);
        for channel_discord_id in &channel_discord_ids {
            self.manager.unsubscribe(channel_discord_id, self.subscriber_id).await;
        }
    }
}

impl Drop for MessageStream {
    fn drop(&mut self) {
        if self.channel_discord_ids.is_empty() {
            return;
        }
        let manager = self.manager.clone();
        let subscriber_id = self.subscriber_id;
        let channel_discord_ids = std::mem::take(&mut self.channel_discord_ids);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                for channel_discord_id in channel_discord_ids {
                    manager.unsubscribe(&channel_discord_id, subscriber_id).await;
                }
            });
        }
    }
}

fn guild_row_to_wire(row: Guild) -> GuildObject {
    GuildObject {
        id: row.discord_guild_id,
        name: row.name,
        icon: row.icon,
        owner: None,
        owner_id: row.owner_id,
        permissions: Some(row.permissions.to_string()),
        features: row.features,
    }
}

fn channel_row_to_wire(row: Channel) -> ChannelObject {
    ChannelObject {
        id: row.discord_channel_id,
        kind: row.kind,
        guild_id: None,
        position: row.position,
        name: row.name,
        topic: row.topic,
        nsfw: Some(row.nsfw),
        last_message_id: row.last_message_id,
        parent_id: row.parent_id,
    }
}
