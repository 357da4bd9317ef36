use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub discord_id: String,
    pub username: String,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OAuthToken {
    pub user_id: i64,
    pub access_token_ciphertext: String,
    pub refresh_token_ciphertext: String,
    pub token_type: String,
    pub expiry: DateTime<Utc>,
    pub scope: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum AuthSessionStatus {
    Pending,
    Authenticated,
    Failed,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthSession {
    pub session_id: String,
    pub user_id: Option<i64>,
    pub status: AuthSessionStatus,
    pub error: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OAuthState {
    pub state: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Guild {
    pub id: i64,
    pub discord_guild_id: String,
    pub name: String,
    pub icon: Option<String>,
    pub owner_id: Option<String>,
    pub permissions: i64,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Channel {
    pub id: i64,
    pub discord_channel_id: String,
    pub guild_id: i64,
    pub name: Option<String>,
    pub kind: i32,
    pub position: Option<i32>,
    pub parent_id: Option<String>,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub last_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub discord_message_id: String,
    pub channel_id: i64,
    pub author_id: String,
    pub author_username: String,
    pub author_avatar: Option<String>,
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub kind: i32,
    pub referenced_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageAttachment {
    pub message_id: i64,
    pub attachment_id: String,
    pub filename: String,
    pub url: String,
    pub proxy_url: Option<String>,
    pub size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum CacheKind {
    Guild,
    Channel,
    Message,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CacheMetadata {
    pub cache_type: CacheKind,
    pub entity_id: String,
    pub user_id: Option<i64>,
    pub last_fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum GatewaySessionStatus {
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl From<gateway::GatewaySessionStatus> for GatewaySessionStatus {
    fn from(status: gateway::GatewaySessionStatus) -> Self {
        match status {
            gateway::GatewaySessionStatus::Connecting => Self::Connecting,
            gateway::GatewaySessionStatus::Connected => Self::Connected,
            gateway::GatewaySessionStatus::Disconnected => Self::Disconnected,
            gateway::GatewaySessionStatus::Failed => Self::Failed,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GatewaySessionRow {
    pub id: i64,
    pub session_id: String,
    pub user_id: i64,
    pub gateway_url: String,
    pub session_token: Option<String>,
    pub sequence_number: i64,
    pub status: GatewaySessionStatus,
    pub last_heartbeat_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GatewaySessionRow {
    pub fn is_active(&self) -> bool {
        self.status == GatewaySessionStatus::Connected && self.expires_at > Utc::now()
    }
}
