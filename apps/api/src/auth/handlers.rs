use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::provisioning::{login, register_company, register_student};
use crate::auth::provisioning::{CompanySignup, StudentSignup};
use crate::auth::token::{bearer_claims, issue_token, token_ttl};
use crate::errors::AppError;
use crate::models::user::{OAuthProvider, UserRow, UserType};
use crate::state::AppState;

/// Public view of an account. `UserRow` itself never serializes, so the
/// password hash cannot leak through a response body.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub user_type: UserType,
    pub oauth_provider: Option<OAuthProvider>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(user: UserRow) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            user_type: user.user_type,
            oauth_provider: user.oauth_provider,
            name: user.name,
            profile_image: user.profile_image,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/signup/student
pub async fn handle_signup_student(
    State(state): State<AppState>,
    Json(req): Json<StudentSignup>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = register_student(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/signup/company
pub async fn handle_signup_company(
    State(state): State<AppState>,
    Json(req): Json<CompanySignup>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = register_company(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = login(&state.db, &req.email, &req.password).await?;
    let access_token = issue_token(&state.config.jwt_secret, user.id, user.user_type, token_ttl())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("token issuance failed: {e}")))?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: user.into(),
    }))
}

/// GET /auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AppError> {
    let claims = bearer_claims(&headers, &state.config.jwt_secret)?;
    let user_id = claims.user_id().ok_or(AppError::Unauthenticated)?;

    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    Ok(Json(user.into()))
}

/// POST /auth/logout
/// Tokens are stateless; the server only tells the client to discard its copy.
pub async fn handle_logout() -> Json<serde_json::Value> {
    Json(json!({ "message": "Logged out. Discard the access token on the client." }))
}
