use serde::{Deserialize, Serialize};

use crate::Snowflake;

/// Represents a Discord Message Object.
///
/// Modeled for the subset this crate persists: the three events it tracks
/// (create/update/delete) and the paginated REST listing share this shape.
/// [Discord documentation](https://discord.com/developers/docs/resources/channel#message-object).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageObject {
    pub id: Snowflake,

    pub channel_id: Snowflake,

    pub author: MessageAuthor,

    #[serde(default)]
    pub content: Option<String>,

    pub timestamp: String,

    #[serde(default)]
    pub edited_timestamp: Option<String>,

    #[serde(rename = "type", default)]
    pub kind: i32,

    #[serde(default)]
    pub message_reference: Option<MessageReference>,

    #[serde(default)]
    pub attachments: Vec<AttachmentObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: Snowflake,

    pub username: String,

    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReference {
    #[serde(default)]
    pub message_id: Option<Snowflake>,

    #[serde(default)]
    pub channel_id: Option<Snowflake>,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentObject {
    pub id: Snowflake,

    pub filename: String,

    pub url: String,

    #[serde(default)]
    pub proxy_url: Option<String>,

    pub size: u64,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    #[serde(default)]
    pub content_type: Option<String>,
}

/// Payload of a `MESSAGE_DELETE` dispatch: Discord only sends the ids, not
/// the message body (the body, if we want one for broadcast, must come
/// from our own store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeleteData {
    pub id: Snowflake,

    pub channel_id: Snowflake,

    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}
