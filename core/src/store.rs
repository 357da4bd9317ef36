use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::PgPool;

use api_types::{AttachmentObject, ChannelObject, GuildObject, MessageObject};
use gateway::{GatewayError, GatewaySessionStatus as WireGatewayStatus, GatewayStore};

use crate::error::{CoreError, Result};
use crate::models::{
    AuthSession, AuthSessionStatus, CacheKind, Channel, Guild, GatewaySessionRow,
    GatewaySessionStatus, Message, MessageAttachment, OAuthToken, User,
};

/// Persistent store over the ten relations: users, encrypted OAuth
/// tokens, pending auth sessions, one-shot CSRF state tokens, guilds and
/// membership, channels, messages and attachments, cache metadata, and
/// gateway session rows. Every public method here is one round-trip
/// (barring the explicit transactions noted below).
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Reads the single row of `schema_migrations` and refuses to call a
    /// dirty database ready; migrations themselves run elsewhere.
    pub async fn migration_status(&self) -> Result<bool> {
        let dirty: Option<bool> = sqlx::query_scalar("SELECT dirty FROM schema_migrations LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(dirty.unwrap_or(false))
    }

    // ---------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------

    /// Upserts on `discord_id`, preserving `created_at`.
    pub async fn create_or_update_user(
        &self,
        discord_id: &str,
        username: &str,
        discriminator: Option<&str>,
        avatar: Option<&str>,
        email: Option<&str>,
    ) -> Result<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (discord_id, username, discriminator, avatar, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            ON CONFLICT (discord_id) DO UPDATE SET
                username = EXCLUDED.username,
                discriminator = EXCLUDED.discriminator,
                avatar = EXCLUDED.avatar,
                email = EXCLUDED.email,
                updated_at = now()
            RETURNING id, discord_id, username, discriminator, avatar, email, created_at, updated_at
            "#,
        )
        .bind(discord_id)
        .bind(username)
        .bind(discriminator)
        .bind(avatar)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get_user_by_discord_id(&self, discord_id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE discord_id = $1")
            .bind(discord_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // OAuth tokens
    // ---------------------------------------------------------------

    /// Upserts the single OAuthToken row a user may have (exactly zero or
    /// one per user).
    #[allow(clippy::too_many_arguments)]
    pub async fn store_oauth_token(
        &self,
        user_id: i64,
        access_token_ciphertext: &str,
        refresh_token_ciphertext: &str,
        token_type: &str,
        expiry: DateTime<Utc>,
        scope: &str,
    ) -> Result<OAuthToken> {
        let row = sqlx::query_as::<_, OAuthToken>(
            r#"
            INSERT INTO oauth_tokens
                (user_id, access_token_ciphertext, refresh_token_ciphertext, token_type, expiry, scope, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            ON CONFLICT (user_id) DO UPDATE SET
                access_token_ciphertext = EXCLUDED.access_token_ciphertext,
                refresh_token_ciphertext = EXCLUDED.refresh_token_ciphertext,
                token_type = EXCLUDED.token_type,
                expiry = EXCLUDED.expiry,
                scope = EXCLUDED.scope,
                updated_at = now()
            RETURNING user_id, access_token_ciphertext, refresh_token_ciphertext, token_type, expiry, scope, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(access_token_ciphertext)
        .bind(refresh_token_ciphertext)
        .bind(token_type)
        .bind(expiry)
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_oauth_token(&self, user_id: i64) -> Result<Option<OAuthToken>> {
        let row = sqlx::query_as::<_, OAuthToken>("SELECT * FROM oauth_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete_oauth_token(&self, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM oauth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Auth sessions / OAuth state
    // ---------------------------------------------------------------

    pub async fn create_auth_session(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthSession> {
        let row = sqlx::query_as::<_, AuthSession>(
            r#"
            INSERT INTO auth_sessions (session_id, user_id, status, error, expires_at, created_at, updated_at)
            VALUES ($1, NULL, 'pending', NULL, $2, now(), now())
            RETURNING session_id, user_id, status, error, expires_at, created_at, updated_at
            "#,
        )
        .bind(session_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_auth_session(&self, session_id: &str) -> Result<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSession>("SELECT * FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Mutates a session to a terminal status: a session transitions at
    /// most once, to `authenticated` or `failed`.
    pub async fn update_auth_session_status(
        &self,
        session_id: &str,
        status: AuthSessionStatus,
        user_id: Option<i64>,
        error: Option<&str>,
    ) -> Result<()> {
        let affected = sqlx::query(
            r#"
            UPDATE auth_sessions
            SET status = $2, user_id = $3, error = $4, updated_at = now()
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .bind(status)
        .bind(user_id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        if affected.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("auth session {session_id}")));
        }
        Ok(())
    }

    pub async fn delete_auth_session(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn store_oauth_state(
        &self,
        state: &str,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO oauth_states (state, session_id, expires_at, created_at) VALUES ($1, $2, $3, now())",
        )
        .bind(state)
        .bind(session_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The single atomic "select where state=? and expires_at>now, then
    /// delete, returning session_id" operation. Single statement so
    /// Postgres's row lock makes it linearizable: exactly one concurrent
    /// caller observes the row.
    pub async fn validate_and_delete_oauth_state(&self, state: &str) -> Result<String> {
        let session_id: Option<String> = sqlx::query_scalar(
            "DELETE FROM oauth_states WHERE state = $1 AND expires_at > now() RETURNING session_id",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(session_id) = session_id {
            return Ok(session_id);
        }

        // Distinguish "never existed" from "existed but expired" for logs
        // without resurrecting the row.
        let expired_exists: Option<bool> = sqlx::query_scalar(
            "SELECT true FROM oauth_states WHERE state = $1 AND expires_at <= now()",
        )
        .bind(state)
        .fetch_optional(&self.pool)
        .await?;

        if expired_exists.is_some() {
            tracing::debug!(state, "oauth state token matched but had expired");
            return Err(CoreError::ExpiredState);
        }

        Err(CoreError::InvalidState)
    }

    /// Deletes expired `auth_sessions` and `oauth_states` rows in one
    /// call. Returns (auth_sessions_deleted, oauth_states_deleted).
    pub async fn cleanup_expired_sessions(&self) -> Result<(u64, u64)> {
        let sessions = sqlx::query("DELETE FROM auth_sessions WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        let states = sqlx::query("DELETE FROM oauth_states WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        Ok((sessions.rows_affected(), states.rows_affected()))
    }

    // ---------------------------------------------------------------
    // Guilds / membership
    // ---------------------------------------------------------------

    pub async fn create_or_update_guild(&self, guild: &GuildObject) -> Result<Guild> {
        let permissions: i64 = guild
            .permissions
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);

        let row = sqlx::query_as::<_, Guild>(
            r#"
            INSERT INTO guilds (discord_guild_id, name, icon, owner_id, permissions, features, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            ON CONFLICT (discord_guild_id) DO UPDATE SET
                name = EXCLUDED.name,
                icon = EXCLUDED.icon,
                owner_id = EXCLUDED.owner_id,
                permissions = EXCLUDED.permissions,
                features = EXCLUDED.features,
                updated_at = now()
            RETURNING id, discord_guild_id, name, icon, owner_id, permissions, features, created_at, updated_at
            "#,
        )
        .bind(&guild.id)
        .bind(&guild.name)
        .bind(&guild.icon)
        .bind(&guild.owner_id)
        .bind(permissions)
        .bind(&guild.features)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_guild_by_discord_id(&self, discord_guild_id: &str) -> Result<Option<Guild>> {
        let row = sqlx::query_as::<_, Guild>("SELECT * FROM guilds WHERE discord_guild_id = $1")
            .bind(discord_guild_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Idempotent: conflict on (user_id, guild_id) is not an error.
    pub async fn create_user_guild(&self, user_id: i64, guild_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_guilds (user_id, guild_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(guild_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_user_guilds(&self, user_id: i64) -> Result<Vec<Guild>> {
        let rows = sqlx::query_as::<_, Guild>(
            r#"
            SELECT g.* FROM guilds g
            JOIN user_guilds ug ON ug.guild_id = g.id
            WHERE ug.user_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn user_has_guild_access(&self, user_id: i64, discord_guild_id: &str) -> Result<bool> {
        let exists: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT true FROM user_guilds ug
            JOIN guilds g ON g.id = ug.guild_id
            WHERE ug.user_id = $1 AND g.discord_guild_id = $2
            "#,
        )
        .bind(user_id)
        .bind(discord_guild_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exists.unwrap_or(false))
    }

    // ---------------------------------------------------------------
    // Channels
    // ---------------------------------------------------------------

    pub async fn create_or_update_channel(&self, guild_id: i64, channel: &ChannelObject) -> Result<Channel> {
        let row = sqlx::query_as::<_, Channel>(
            r#"
            INSERT INTO channels
                (discord_channel_id, guild_id, name, kind, position, parent_id, topic, nsfw, last_message_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
            ON CONFLICT (discord_channel_id) DO UPDATE SET
                guild_id = EXCLUDED.guild_id,
                name = EXCLUDED.name,
                kind = EXCLUDED.kind,
                position = EXCLUDED.position,
                parent_id = EXCLUDED.parent_id,
                topic = EXCLUDED.topic,
                nsfw = EXCLUDED.nsfw,
                last_message_id = EXCLUDED.last_message_id,
                updated_at = now()
            RETURNING id, discord_channel_id, guild_id, name, kind, position, parent_id, topic, nsfw, last_message_id, created_at, updated_at
            "#,
        )
        .bind(&channel.id)
        .bind(guild_id)
        .bind(&channel.name)
        .bind(channel.kind)
        .bind(channel.position)
        .bind(&channel.parent_id)
        .bind(&channel.topic)
        .bind(channel.nsfw.unwrap_or(false))
        .bind(&channel.last_message_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_channel_by_discord_id(&self, discord_channel_id: &str) -> Result<Option<Channel>> {
        let row = sqlx::query_as::<_, Channel>("SELECT * FROM channels WHERE discord_channel_id = $1")
            .bind(discord_channel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_guild_channels(&self, guild_id: i64) -> Result<Vec<Channel>> {
        let rows = sqlx::query_as::<_, Channel>(
            "SELECT * FROM channels WHERE guild_id = $1 ORDER BY position NULLS LAST, name",
        )
        .bind(guild_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Access is transitive through guild membership.
    pub async fn user_has_channel_access(&self, user_id: i64, discord_channel_id: &str) -> Result<bool> {
        let exists: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT true FROM channels c
            JOIN user_guilds ug ON ug.guild_id = c.guild_id
            WHERE ug.user_id = $1 AND c.discord_channel_id = $2
            "#,
        )
        .bind(user_id)
        .bind(discord_channel_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exists.unwrap_or(false))
    }

    // ---------------------------------------------------------------
    // Messages / attachments
    // ---------------------------------------------------------------

    pub async fn create_or_update_message(&self, channel_id: i64, message: &MessageObject) -> Result<Message> {
        let timestamp = parse_discord_timestamp(&message.timestamp);
        let edited_timestamp = message
            .edited_timestamp
            .as_deref()
            .map(parse_discord_timestamp);
        let referenced_message_id = message
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id.clone());

        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages
                (discord_message_id, channel_id, author_id, author_username, author_avatar,
                 content, timestamp, edited_timestamp, kind, referenced_message_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now(), now())
            ON CONFLICT (discord_message_id) DO UPDATE SET
                content = EXCLUDED.content,
                edited_timestamp = EXCLUDED.edited_timestamp,
                author_username = EXCLUDED.author_username,
                author_avatar = EXCLUDED.author_avatar,
                updated_at = now()
            RETURNING id, discord_message_id, channel_id, author_id, author_username, author_avatar,
                      content, timestamp, edited_timestamp, kind, referenced_message_id, created_at, updated_at
            "#,
        )
        .bind(&message.id)
        .bind(channel_id)
        .bind(&message.author.id)
        .bind(&message.author.username)
        .bind(&message.author.avatar)
        .bind(&message.content)
        .bind(timestamp)
        .bind(edited_timestamp)
        .bind(message.kind)
        .bind(referenced_message_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_message_by_discord_id(&self, discord_message_id: &str) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE discord_message_id = $1")
            .bind(discord_message_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Attachments cascade from their message; conflicts on
    /// (message_id, attachment_id) are updates.
    pub async fn upsert_message_attachment(
        &self,
        message_id: i64,
        attachment: &AttachmentObject,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO message_attachments
                (message_id, attachment_id, filename, url, proxy_url, size, width, height, content_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (message_id, attachment_id) DO UPDATE SET
                filename = EXCLUDED.filename,
                url = EXCLUDED.url,
                proxy_url = EXCLUDED.proxy_url,
                size = EXCLUDED.size,
                width = EXCLUDED.width,
                height = EXCLUDED.height,
                content_type = EXCLUDED.content_type
            "#,
        )
        .bind(message_id)
        .bind(&attachment.id)
        .bind(&attachment.filename)
        .bind(&attachment.url)
        .bind(&attachment.proxy_url)
        .bind(attachment.size as i64)
        .bind(attachment.width.map(|w| w as i32))
        .bind(attachment.height.map(|h| h as i32))
        .bind(&attachment.content_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Reassembles a stored row (plus its attachments) into the wire shape
    /// the RPC facade returns for cache hits and upstream fetches alike.
    pub async fn message_to_wire(&self, message: &Message) -> Result<MessageObject> {
        let attachments = self.get_message_attachments(message.id).await?;
        let discord_channel_id = self.discord_channel_id_for(message.channel_id).await?;

        Ok(MessageObject {
            id: message.discord_message_id.clone(),
            channel_id: discord_channel_id,
            author: api_types::MessageAuthor {
                id: message.author_id.clone(),
                username: message.author_username.clone(),
                avatar: message.author_avatar.clone(),
            },
            content: message.content.clone(),
            timestamp: message.timestamp.to_rfc3339(),
            edited_timestamp: message.edited_timestamp.map(|t| t.to_rfc3339()),
            kind: message.kind,
            message_reference: message.referenced_message_id.clone().map(|message_id| {
                api_types::MessageReference {
                    message_id: Some(message_id),
                    channel_id: None,
                    guild_id: None,
                }
            }),
            attachments: attachments
                .into_iter()
                .map(|a| AttachmentObject {
                    id: a.attachment_id,
                    filename: a.filename,
                    url: a.url,
                    proxy_url: a.proxy_url,
                    size: a.size as u64,
                    width: a.width.map(|w| w as u32),
                    height: a.height.map(|h| h as u32),
                    content_type: a.content_type,
                })
                .collect(),
        })
    }

    pub async fn get_message_attachments(&self, message_id: i64) -> Result<Vec<MessageAttachment>> {
        let rows = sqlx::query_as::<_, MessageAttachment>(
            "SELECT * FROM message_attachments WHERE message_id = $1 ORDER BY attachment_id",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Pagination: `before` selects strictly-less timestamps DESC, `after`
    /// strictly-greater ASC, neither gives DESC. Limit clamped [1,100]
    /// default 50.
    pub async fn get_messages_by_channel_id(
        &self,
        channel_id: i64,
        limit: Option<u32>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<Message>> {
        let limit = limit.unwrap_or(50).clamp(1, 100) as i64;

        if let Some(before) = before.filter(|b| !b.is_empty()) {
            let rows = sqlx::query_as::<_, Message>(
                r#"
                SELECT m.* FROM messages m
                WHERE m.channel_id = $1
                  AND m.timestamp < (SELECT timestamp FROM messages WHERE discord_message_id = $2)
                ORDER BY m.timestamp DESC
                LIMIT $3
                "#,
            )
            .bind(channel_id)
            .bind(before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            return Ok(rows);
        }

        if let Some(after) = after.filter(|a| !a.is_empty()) {
            let rows = sqlx::query_as::<_, Message>(
                r#"
                SELECT m.* FROM messages m
                WHERE m.channel_id = $1
                  AND m.timestamp > (SELECT timestamp FROM messages WHERE discord_message_id = $2)
                ORDER BY m.timestamp ASC
                LIMIT $3
                "#,
            )
            .bind(channel_id)
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            return Ok(rows);
        }

        let rows = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE channel_id = $1 ORDER BY timestamp DESC LIMIT $2",
        )
        .bind(channel_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Attachments cascade.
    pub async fn delete_message(&self, discord_message_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM messages WHERE discord_message_id = $1")
            .bind(discord_message_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Cache metadata
    // ---------------------------------------------------------------

    /// NULL-distinct composite key lookup: `user_id = $3 OR (user_id IS
    /// NULL AND $3 IS NULL)`.
    pub async fn check_cache(
        &self,
        kind: CacheKind,
        entity_id: &str,
        user_id: Option<i64>,
    ) -> Result<bool> {
        let valid: Option<bool> = sqlx::query_scalar(
            r#"
            SELECT true FROM cache_metadata
            WHERE cache_type = $1 AND entity_id = $2
              AND (user_id = $3 OR (user_id IS NULL AND $3 IS NULL))
              AND expires_at > now()
            "#,
        )
        .bind(kind)
        .bind(entity_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(valid.unwrap_or(false))
    }

    /// Upserts the (kind, entity, user) row with `last_fetched_at=now,
    /// expires_at=now+ttl`. No database unique constraint can express the
    /// NULL-distinct key directly, so this does an explicit
    /// update-then-insert inside a transaction rather than `ON CONFLICT`.
    pub async fn set_cache(
        &self,
        kind: CacheKind,
        entity_id: &str,
        user_id: Option<i64>,
        ttl: ChronoDuration,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let expires_at = Utc::now() + ttl;

        let updated = sqlx::query(
            r#"
            UPDATE cache_metadata
            SET last_fetched_at = now(), expires_at = $4
            WHERE cache_type = $1 AND entity_id = $2
              AND (user_id = $3 OR (user_id IS NULL AND $3 IS NULL))
            "#,
        )
        .bind(kind)
        .bind(entity_id)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query(
                r#"
                INSERT INTO cache_metadata (cache_type, entity_id, user_id, last_fetched_at, expires_at)
                VALUES ($1, $2, $3, now(), $4)
                "#,
            )
            .bind(kind)
            .bind(entity_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Removes the message-kind cache entry for a channel globally.
    pub async fn invalidate_channel_cache(&self, channel_discord_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM cache_metadata WHERE cache_type = $1 AND entity_id = $2")
            .bind(CacheKind::Message)
            .bind(channel_discord_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Background reaper sweep: deletes rows past their TTL.
    pub async fn reap_expired_cache(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cache_metadata WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ---------------------------------------------------------------
    // Gateway sessions
    // ---------------------------------------------------------------

    pub async fn get_gateway_session(&self, user_id: i64) -> Result<Option<GatewaySessionRow>> {
        let row = sqlx::query_as::<_, GatewaySessionRow>(
            "SELECT * FROM gateway_sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// `Message.channel_id` is the internal FK; dispatch broadcast and the
    /// wire `MessageObject` both need the Discord snowflake, so this joins
    /// back to `channels` for it.
    async fn discord_channel_id_for(&self, channel_id: i64) -> Result<String> {
        let id: String =
            sqlx::query_scalar("SELECT discord_channel_id FROM channels WHERE id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(id)
    }
}

fn parse_discord_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// The gateway crate has no dependency on `core`'s concrete `Store`, only
/// on this trait, so this impl is the one place the two meet.
#[async_trait]
impl GatewayStore for Store {
    async fn is_channel_tracked(&self, discord_channel_id: &str) -> gateway::Result<bool> {
        self.get_channel_by_discord_id(discord_channel_id)
            .await
            .map(|c| c.is_some())
            .map_err(|e| GatewayError::Store(e.to_string()))
    }

    async fn upsert_dispatched_message(
        &self,
        message: &MessageObject,
    ) -> gateway::Result<MessageObject> {
        let channel = self
            .get_channel_by_discord_id(&message.channel_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?
            .ok_or_else(|| GatewayError::Store(format!("untracked channel {}", message.channel_id)))?;

        self.create_or_update_message(channel.id, message)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        Ok(message.clone())
    }

    async fn apply_message_update(
        &self,
        discord_message_id: &str,
        content: Option<&str>,
        edited_timestamp: Option<&str>,
    ) -> gateway::Result<Option<MessageObject>> {
        let Some(existing) = self
            .get_message_by_discord_id(discord_message_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?
        else {
            return Ok(None);
        };

        let edited = edited_timestamp.map(parse_discord_timestamp);
        sqlx::query(
            "UPDATE messages SET content = $2, edited_timestamp = $3, updated_at = now() WHERE discord_message_id = $1",
        )
        .bind(discord_message_id)
        .bind(content)
        .bind(edited)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::Store(e.to_string()))?;

        let channel_discord_id = self
            .discord_channel_id_for(existing.channel_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        Ok(Some(MessageObject {
            id: existing.discord_message_id,
            channel_id: channel_discord_id,
            author: api_types::MessageAuthor {
                id: existing.author_id,
                username: existing.author_username,
                avatar: existing.author_avatar,
            },
            content: content.map(str::to_owned).or(existing.content),
            timestamp: existing.timestamp.to_rfc3339(),
            edited_timestamp: edited_timestamp.map(str::to_owned),
            kind: existing.kind,
            message_reference: None,
            attachments: Vec::new(),
        }))
    }

    async fn delete_dispatched_message(
        &self,
        discord_message_id: &str,
    ) -> gateway::Result<Option<MessageObject>> {
        let Some(existing) = self
            .get_message_by_discord_id(discord_message_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?
        else {
            return Ok(None);
        };

        let channel_discord_id = self
            .discord_channel_id_for(existing.channel_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        self.delete_message(discord_message_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?;

        Ok(Some(MessageObject {
            id: existing.discord_message_id,
            channel_id: channel_discord_id,
            author: api_types::MessageAuthor {
                id: existing.author_id,
                username: existing.author_username,
                avatar: existing.author_avatar,
            },
            content: existing.content,
            timestamp: existing.timestamp.to_rfc3339(),
            edited_timestamp: existing.edited_timestamp.map(|t| t.to_rfc3339()),
            kind: existing.kind,
            message_reference: None,
            attachments: Vec::new(),
        }))
    }

    async fn persist_attachment(
        &self,
        discord_message_id: &str,
        attachment: &AttachmentObject,
    ) -> gateway::Result<()> {
        let Some(message) = self
            .get_message_by_discord_id(discord_message_id)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))?
        else {
            return Ok(());
        };

        self.upsert_message_attachment(message.id, attachment)
            .await
            .map_err(|e| GatewayError::Store(e.to_string()))
    }

    async fn record_gateway_session(
        &self,
        user_id: i64,
        session_id: &str,
        gateway_url: &str,
    ) -> gateway::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO gateway_sessions
                (session_id, user_id, gateway_url, sequence_number, status, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, 0, 'connected', now() + interval '1 day', now(), now())
            ON CONFLICT (user_id) DO UPDATE SET
                session_id = EXCLUDED.session_id,
                gateway_url = EXCLUDED.gateway_url,
                status = 'connected',
                expires_at = now() + interval '1 day',
                updated_at = now()
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(gateway_url)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(())
    }

    async fn update_gateway_status(
        &self,
        user_id: i64,
        status: WireGatewayStatus,
        last_sequence: Option<i64>,
    ) -> gateway::Result<()> {
        let status: GatewaySessionStatus = status.into();
        sqlx::query(
            r#"
            UPDATE gateway_sessions
            SET status = $2, sequence_number = COALESCE($3, sequence_number), last_heartbeat_at = now(), updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(last_sequence)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::Store(e.to_string()))?;
        Ok(())
    }
}
