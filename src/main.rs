//! Chat relay server entry point.
//!
//! Loads configuration from the environment, connects the Postgres and
//! Redis backends, wires the application services, and serves the HTTP
//! API until a shutdown signal arrives.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use chat_relay::adapters::http::{app_router, AppState};
use chat_relay::adapters::http::middleware::RateLimitGate;
use chat_relay::adapters::openrouter::{OpenRouterClient, OpenRouterConfig};
use chat_relay::adapters::postgres::{PgConversationStore, PgUserStore};
use chat_relay::adapters::redis_store::{RedisRateLimiter, RedisTokenCache};
use chat_relay::application::auth::{AuthService, JwtCodec};
use chat_relay::application::chat::ChatService;
use chat_relay::application::models::ModelCatalogService;
use chat_relay::config::{AppConfig, LoggingConfig, UpstreamConfig};
use chat_relay::ports::{
    CompletionClient, ConversationStore, RateLimiter, TokenCache, UserStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Chat relay starting"
    );

    // ── Backends ──────────────────────────────────────────────────────

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(config.database.url())
        .await?;
    info!("Connected to Postgres");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations applied");
    }

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = tokio::time::timeout(
        config.redis.connect_timeout(),
        redis_client.get_multiplexed_tokio_connection(),
    )
    .await
    .map_err(|_| "Timed out connecting to Redis")??;
    info!("Connected to Redis");

    // ── Adapters ──────────────────────────────────────────────────────

    let conversations: Arc<dyn ConversationStore> = Arc::new(PgConversationStore::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let limiter: Arc<dyn RateLimiter> = Arc::new(RedisRateLimiter::new(
        redis_conn.clone(),
        config.rate_limit.limit,
        config.rate_limit.window_secs,
    ));
    let tokens: Arc<dyn TokenCache> = Arc::new(RedisTokenCache::new(redis_conn));
    let completions: Arc<dyn CompletionClient> =
        Arc::new(OpenRouterClient::new(openrouter_config(&config.upstream)));

    // ── Services ─────────────────────────────────────────────────────

    let chat = ChatService::new(
        Arc::clone(&conversations),
        Arc::clone(&completions),
        config.upstream.default_model.clone(),
    );
    let jwt = JwtCodec::new(config.auth.jwt_secret(), config.auth.token_validity_secs);
    let auth = AuthService::new(users, tokens, jwt);
    let catalog = Arc::new(ModelCatalogService::new(completions));

    let state = AppState::new(chat, auth, catalog, conversations);
    let gate = RateLimitGate::new(limiter, config.rate_limit.fail_open);
    let app = app_router(state, gate, &config.server);

    // ── Serve ────────────────────────────────────────────────────────

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Chat relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Chat relay stopped");
    Ok(())
}

/// Applies the configured filter and output format.
///
/// `RUST_LOG` overrides the configured filter when set, which keeps the
/// usual debugging workflow available in any environment.
fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Maps upstream configuration onto the OpenRouter client.
fn openrouter_config(upstream: &UpstreamConfig) -> OpenRouterConfig {
    let mut config = OpenRouterConfig::new(upstream.api_key())
        .with_base_url(&upstream.base_url)
        .with_default_model(&upstream.default_model)
        .with_timeout(upstream.timeout());

    if let Some(referer) = &upstream.referer {
        config = config.with_referer(referer);
    }
    if let Some(title) = &upstream.title {
        config = config.with_title(title);
    }

    config
}

/// Resolves when the process should shut down (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
