use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::handlers::UserResponse;
use crate::auth::provisioning::get_or_create_oauth_user;
use crate::auth::token::{issue_token, token_ttl};
use crate::errors::AppError;
use crate::models::user::OAuthProvider;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct OAuthCallbackResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserResponse,
    pub is_new_user: bool,
}

/// GET /auth/login/:provider
/// Sends the browser to the provider's consent screen.
pub async fn handle_oauth_login(
    State(state): State<AppState>,
    Path(provider): Path<OAuthProvider>,
) -> Result<Redirect, AppError> {
    let url = state.oauth.authorize_url(provider)?;
    Ok(Redirect::to(&url))
}

/// GET /auth/callback/:provider?code=...
/// Redeems the authorization code and signs the resolved account in.
pub async fn handle_oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<OAuthProvider>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<OAuthCallbackResponse>, AppError> {
    let info = state.oauth.exchange_code(provider, &query.code).await?;
    let (user, is_new_user) = get_or_create_oauth_user(&state.db, provider, info).await?;

    let access_token = issue_token(&state.config.jwt_secret, user.id, user.user_type, token_ttl())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("token issuance failed: {e}")))?;

    Ok(Json(OAuthCallbackResponse {
        access_token,
        token_type: "bearer",
        user: user.into(),
        is_new_user,
    }))
}
