use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::notify::Notifier;
use crate::oauth::OAuthClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub oauth: OAuthClient,
    /// Pluggable notification backend. Default: Slack webhook from config.
    pub notifier: Arc<dyn Notifier>,
}
