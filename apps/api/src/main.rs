mod auth;
mod config;
mod db;
mod errors;
mod models;
mod notify;
mod oauth;
mod portfolio;
mod resume;
mod routes;
mod state;
mod talent;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::notify::SlackNotifier;
use crate::oauth::OAuthClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting talent-connect API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and bring the schema up to date
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // The media root must exist before the first upload or static read
    tokio::fs::create_dir_all(&config.media_dir).await?;
    info!("Serving uploads from {}/", config.media_dir);

    let oauth = OAuthClient::from_config(&config);
    let notifier = Arc::new(SlackNotifier::new(config.slack_webhook_url.clone()));
    if config.slack_webhook_url.is_none() {
        info!("SLACK_WEBHOOK_URL not set; connect-request notifications are disabled");
    }

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        oauth,
        notifier,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
