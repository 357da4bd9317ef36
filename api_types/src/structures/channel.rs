use serde::{Deserialize, Serialize};

use crate::Snowflake;

/// Represents a Discord Channel Object, as returned by `/guilds/{id}/channels`.
/// [Discord documentation](https://discord.com/developers/docs/resources/channel#channel-object).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelObject {
    pub id: Snowflake,

    #[serde(rename = "type")]
    pub kind: i32,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,

    #[serde(default)]
    pub position: Option<i32>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub topic: Option<String>,

    #[serde(default)]
    pub nsfw: Option<bool>,

    #[serde(default)]
    pub last_message_id: Option<Snowflake>,

    #[serde(default)]
    pub parent_id: Option<Snowflake>,
}
