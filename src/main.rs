// ============================================================================
// Vitrine Server Binary
// ============================================================================
//
// Wires the admission core in front of the content API: Redis-backed rate
// limiting, Postgres-backed versioned content, health endpoints.
//
// ============================================================================

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_config::Config;
use vitrine_redis::RedisClient;

use vitrine_server::content::PgArticleStore;
use vitrine_server::db;
use vitrine_server::handlers::AppState;
use vitrine_server::ratelimit::{PolicySelector, RateLimitState, RateLimiter, RedisCounterStore};
use vitrine_server::routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Vitrine Server Starting ===");
    info!("Port: {}", config.port);
    info!("Environment: {:?}", config.environment);

    let redis = RedisClient::connect(&config.redis_url)
        .await
        .context("Failed to connect to Redis")?;
    info!("Connected to Redis");

    let pool = db::create_pool(&config.database_url, &config.db)
        .await
        .context("Failed to connect to Postgres")?;
    info!("Connected to database");

    let limiter = RateLimiter::new(
        Arc::new(RedisCounterStore::new(redis)),
        Duration::from_millis(config.rate_limit.store_timeout_ms),
    );
    let rate_limit = Arc::new(RateLimitState {
        selector: PolicySelector::new(&config.rate_limit),
        limiter,
        key_prefix: config.redis_key_prefixes.rate.clone(),
    });

    let state = AppState {
        articles: Arc::new(PgArticleStore::new(pool)),
    };

    let app = routes::app(state, rate_limit);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .context("Failed to parse bind address")?;

    info!("Vitrine server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Failed to start server")?;

    Ok(())
}
