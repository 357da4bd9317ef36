use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_types::GatewayIntentBits;
use core_gateway::config::{Config, LogFormat};
use core_gateway::gateway::GatewayManager;
use core_gateway::rest::{DiscordClient, DiscordClientConfig};
use core_gateway::{CacheManager, Crypto, OAuthOrchestrator, RpcFacade, StateManager, Store, TokenService};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Constructs every component this core exposes and idles until
/// interrupted. The actual RPC/HTTP transport framing that would drive
/// these components is out of scope here; this binary exists only
/// to prove the wiring compiles end to end, with no server framing
/// around it.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("loading configuration")?;
    init_logging(&config.log);

    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_open_conns)
        .min_connections(config.db.max_idle_conns)
        .max_lifetime(Duration::from_secs(config.db.conn_max_lifetime_secs))
        .acquire_timeout(Duration::from_secs(5))
        .connect(&env::var("DATABASE_URL").context("DATABASE_URL not set")?)
        .await
        .context("connecting to database")?;

    let store = Store::new(pool);
    if store.migration_status().await.context("reading schema_migrations")? {
        anyhow::bail!("database schema is in a dirty migration state, refusing to start");
    }

    let crypto = Arc::new(
        Crypto::new(&decode_key(&config.security.token_encryption_key)?)
            .context("constructing token crypto")?,
    );

    let discord = Arc::new(DiscordClient::new(DiscordClientConfig {
        client_id: config.discord.client_id.clone(),
        client_secret: config.discord.client_secret.clone(),
        redirect_uri: config.discord.redirect_uri.clone(),
        scopes: config.discord.scopes.clone(),
        bot_token: config.discord.bot_token.clone(),
    }));

    let state_manager = Arc::new(StateManager::new(store.clone(), config.security.state_expiry_minutes));
    let oauth = Arc::new(OAuthOrchestrator::new(
        store.clone(),
        discord.clone(),
        crypto.clone(),
        state_manager.clone(),
    ));
    let cache = Arc::new(CacheManager::new(store.clone(), &config.cache));
    let tokens = Arc::new(TokenService::new(store.clone(), discord.clone(), crypto.clone()));

    let gateway = if config.websocket.enabled {
        let manager = GatewayManager::new(
            "wss://gateway.discord.gg/?v=10&encoding=json".to_owned(),
            GatewayIntentBits::GuildMessages,
            Arc::new(store.clone()),
            tokens.clone(),
        );
        manager.clone().spawn_cleanup_ticker_with(
            Duration::from_secs(60),
            Duration::from_secs(config.websocket.stale_connection_after_secs),
        );
        Some(manager)
    } else {
        None
    };

    let facade = RpcFacade::new(
        store.clone(),
        discord.clone(),
        state_manager,
        oauth,
        cache.clone(),
        tokens,
        gateway.clone(),
        &config,
    );
    let _facade = Arc::new(facade);

    spawn_cache_reaper(cache);
    spawn_session_cleanup(store);

    info!("core components wired; awaiting shutdown signal");
    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;

    if let Some(gateway) = gateway {
        gateway.shutdown().await;
    }

    Ok(())
}

/// Wires `config.log.{level,format}` to a `tracing-subscriber` layer;
/// structured logging sinks beyond this are out of scope, but the
/// recognized level/format keys still come off the same layered config.
fn init_logging(log: &core_gateway::config::LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_new(&log.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log.format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn load_config() -> anyhow::Result<Config> {
    use config::{Config as Layered, Environment, File};

    let layered = Layered::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::with_prefix("CORE_GATEWAY").separator("__"))
        .build()
        .context("building layered configuration")?;

    layered
        .try_deserialize()
        .or_else(|_| Ok(Config::default()))
}

fn decode_key(encoded: &str) -> anyhow::Result<Vec<u8>> {
    use base64::{engine::general_purpose::STANDARD, Engine};
    STANDARD
        .decode(encoded)
        .context("token_encryption_key must be 32 bytes, base64-encoded")
}

fn spawn_cache_reaper(cache: Arc<CacheManager>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(300));
        loop {
            ticker.tick().await;
            if let Err(err) = cache.reap_expired().await {
                tracing::warn!(%err, "cache reaper sweep failed");
            }
        }
    });
}

fn spawn_session_cleanup(store: Store) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(300));
        loop {
            ticker.tick().await;
            match store.cleanup_expired_sessions().await {
                Ok((sessions, states)) => {
                    if sessions > 0 || states > 0 {
                        tracing::debug!(sessions, states, "cleaned up expired sessions/state tokens");
                    }
                }
                Err(err) => tracing::warn!(%err, "session cleanup sweep failed"),
            }
        }
    });
}
