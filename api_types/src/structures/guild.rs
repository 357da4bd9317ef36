use serde::{Deserialize, Serialize};

use crate::Snowflake;

/// Represents a Discord Guild Object, as returned by `/users/@me/guilds`.
///
/// Only the fields this crate's cache and store care about are modeled;
/// Discord's guild object carries many more (roles, emojis, ...) that are
/// out of scope for a read-only guild listing.
/// [Discord documentation](https://discord.com/developers/docs/resources/guild#guild-object).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildObject {
    pub id: Snowflake,

    pub name: String,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub owner: Option<bool>,

    #[serde(default)]
    pub owner_id: Option<Snowflake>,

    /// Total permissions for the current user in the guild, as a stringified
    /// bitset (present only on `/users/@me/guilds`).
    #[serde(default)]
    pub permissions: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableGuildObject {
    pub id: Snowflake,

    pub unavailable: bool,
}
