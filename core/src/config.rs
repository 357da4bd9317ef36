use std::time::Duration;

use serde::Deserialize;

/// Process configuration. Loading (env/file layering, defaults,
/// validation of e.g. the 32-byte encryption key) is the embedding
/// binary's job; this type only describes the recognized shape so it can
/// be deserialized with the `config` crate.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    pub security: SecurityConfig,
    pub cache: CacheConfig,
    pub db: DbConfig,
    pub websocket: WebSocketConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Ports for the two external transports (§6). Binding them is the
/// embedding binary's job, since the transports themselves are out of
/// scope here; this only carries the recognized config keys.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub rpc_port: u16,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rpc_port: 50051,
            http_port: 8080,
        }
    }
}

/// Structured logging is wired by the embedding binary via
/// `tracing-subscriber`; this only carries the recognized level/format
/// keys so they can come from the same layered configuration source.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub bot_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Base64 or hex encoding of the 32-byte AEAD key; decoded by `Crypto::new`.
    pub token_encryption_key: String,
    pub session_expiry_hours: i64,
    pub state_expiry_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub guild_ttl_hours: i64,
    pub channel_ttl_minutes: i64,
    pub message_ttl_minutes: i64,
}

impl CacheConfig {
    pub fn guild_ttl(&self) -> Duration {
        Duration::from_secs((self.guild_ttl_hours * 3600).max(0) as u64)
    }

    pub fn channel_ttl(&self) -> Duration {
        Duration::from_secs((self.channel_ttl_minutes * 60).max(0) as u64)
    }

    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs((self.message_ttl_minutes * 60).max(0) as u64)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    #[serde(default = "default_conn_max_lifetime_secs")]
    pub conn_max_lifetime_secs: u64,
}

fn default_conn_max_lifetime_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    pub enabled: bool,
    pub max_connections_per_user: u32,
    #[serde(default = "default_stale_connection_after_secs")]
    pub stale_connection_after_secs: u64,
}

fn default_stale_connection_after_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                scopes: vec!["identify".into(), "guilds".into()],
                bot_token: String::new(),
            },
            security: SecurityConfig {
                token_encryption_key: String::new(),
                session_expiry_hours: 24,
                state_expiry_minutes: 10,
            },
            cache: CacheConfig {
                guild_ttl_hours: 1,
                channel_ttl_minutes: 30,
                message_ttl_minutes: 5,
            },
            db: DbConfig {
                max_open_conns: 10,
                max_idle_conns: 5,
                conn_max_lifetime_secs: 3600,
            },
            websocket: WebSocketConfig {
                enabled: true,
                max_connections_per_user: 1,
                stale_connection_after_secs: 120,
            },
            server: ServerConfig::default(),
            log: LogConfig::default(),
        }
    }
}
