//! Coverline API server binary
//!
//! Starts the HTTP server for the insurance administration backend.
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin coverline-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 DATABASE_URL=postgres://... cargo run --bin coverline-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_ACCESS_TOKEN_SECS` - Access token validity in seconds (default: 3600)
//! * `API_REFRESH_TOKEN_SECS` - Refresh token validity in seconds (default: 604800)
//! * `API_DATABASE_URL` / `DATABASE_URL` - PostgreSQL connection string
//! * `API_STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret
//! * `API_RAZORPAY_WEBHOOK_SECRET` - Razorpay webhook signing secret
//! * `API_STATIC_DIR` - Directory of static front-end assets (default: static)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use std::net::SocketAddr;

use anyhow::Context;
use interface_api::{config::ApiConfig, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Coverline API server"
    );

    let pool = infra_db::create_pool_from_url(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    infra_db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let app = create_router(pool, config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid server address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables
///
/// Falls back to individual variables, then to defaults, when the prefixed
/// set is incomplete.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| {
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            jwt_secret: std::env::var("API_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            access_token_secs: std::env::var("API_ACCESS_TOKEN_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_token_secs),
            refresh_token_secs: std::env::var("API_REFRESH_TOKEN_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.refresh_token_secs),
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("API_DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            stripe_webhook_secret: std::env::var("API_STRIPE_WEBHOOK_SECRET")
                .unwrap_or(defaults.stripe_webhook_secret),
            razorpay_webhook_secret: std::env::var("API_RAZORPAY_WEBHOOK_SECRET")
                .unwrap_or(defaults.razorpay_webhook_secret),
            static_dir: std::env::var("API_STATIC_DIR").unwrap_or(defaults.static_dir),
            log_level: std::env::var("API_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    })
}

/// Initializes the tracing subscriber
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves when the process receives a shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
