use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub rust_log: String,
    /// Root directory for uploaded images, served under `/media`.
    pub media_dir: String,
    /// Connect-request notifications are skipped when unset.
    pub slack_webhook_url: Option<String>,
    /// Base URL the OAuth callback routes are reachable at.
    pub oauth_redirect_base: String,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub kakao_client_id: Option<String>,
    pub kakao_client_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            media_dir: std::env::var("MEDIA_DIR").unwrap_or_else(|_| "media".to_string()),
            slack_webhook_url: optional_env("SLACK_WEBHOOK_URL"),
            oauth_redirect_base: std::env::var("OAUTH_REDIRECT_BASE")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            google_client_id: optional_env("GOOGLE_CLIENT_ID"),
            google_client_secret: optional_env("GOOGLE_CLIENT_SECRET"),
            kakao_client_id: optional_env("KAKAO_CLIENT_ID"),
            kakao_client_secret: optional_env("KAKAO_CLIENT_SECRET"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Missing and empty values both count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
