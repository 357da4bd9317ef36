use chrono::Duration as ChronoDuration;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::CacheKind;
use crate::store::Store;

/// Thin policy layer over [`Store`]'s cache-metadata rows: per-kind TTLs,
/// per-user scoping, hit/miss semantics. Holds no entity data of its own;
/// `Store` remains the single owner of persistent state.
pub struct CacheManager {
    store: Store,
    guild_ttl: ChronoDuration,
    channel_ttl: ChronoDuration,
    message_ttl: ChronoDuration,
}

impl CacheManager {
    pub fn new(store: Store, config: &CacheConfig) -> Self {
        Self {
            store,
            guild_ttl: ChronoDuration::from_std(config.guild_ttl()).unwrap_or_default(),
            channel_ttl: ChronoDuration::from_std(config.channel_ttl()).unwrap_or_default(),
            message_ttl: ChronoDuration::from_std(config.message_ttl()).unwrap_or_default(),
        }
    }

    fn ttl(&self, kind: CacheKind) -> ChronoDuration {
        match kind {
            CacheKind::Guild => self.guild_ttl,
            CacheKind::Channel => self.channel_ttl,
            CacheKind::Message => self.message_ttl,
        }
    }

    /// `entity` is the guild discord id for guild/channel-list caches
    /// (channel lists are scoped per-guild, not per-channel) and the
    /// channel discord id for message caches.
    pub async fn check(&self, kind: CacheKind, entity: &str, user_id: Option<i64>) -> Result<bool> {
        self.store.check_cache(kind, entity, user_id).await
    }

    pub async fn set(&self, kind: CacheKind, entity: &str, user_id: Option<i64>) -> Result<()> {
        self.store.set_cache(kind, entity, user_id, self.ttl(kind)).await
    }

    pub async fn invalidate_channel_cache(&self, channel_discord_id: &str) -> Result<()> {
        self.store.invalidate_channel_cache(channel_discord_id).await
    }

    /// Background reaper: deletes cache rows past `expires_at`. Intended
    /// to be driven by a ticker the embedding binary owns.
    pub async fn reap_expired(&self) -> Result<u64> {
        self.store.reap_expired_cache().await
    }
}
