//! OAuth client for social sign-in.
//!
//! All provider traffic goes through `OAuthClient`; no other module talks
//! to Google or Kakao directly. The client is constructed once at startup
//! from `Config` and carries only the providers that are configured.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::OAuthProvider;

pub mod handlers;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPE: &str = "openid email profile";

const KAKAO_AUTH_URL: &str = "https://kauth.kakao.com/oauth/authorize";
const KAKAO_TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
const KAKAO_USERINFO_URL: &str = "https://kapi.kakao.com/v2/user/me";
const KAKAO_SCOPE: &str = "profile_nickname profile_image account_email";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("{0} sign-in is not configured")]
    NotConfigured(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::NotConfigured(provider) => {
                AppError::Validation(format!("{provider} sign-in is not configured"))
            }
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

/// Provider-neutral identity attributes extracted from a userinfo response.
#[derive(Debug, Clone)]
pub struct OAuthUserInfo {
    /// Provider-scoped stable subject id.
    pub id: String,
    pub email: Option<String>,
    /// Whether the provider itself vouches for the email address.
    /// Account-merge decisions key off this.
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Clone)]
struct ProviderSettings {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserPayload {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KakaoUserPayload {
    id: i64,
    #[serde(default)]
    kakao_account: KakaoAccount,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    #[serde(default)]
    is_email_verified: bool,
    #[serde(default)]
    profile: KakaoProfile,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoProfile {
    nickname: Option<String>,
    profile_image_url: Option<String>,
}

impl OAuthUserInfo {
    fn from_google(payload: GoogleUserPayload) -> Self {
        OAuthUserInfo {
            id: payload.sub,
            email: payload.email,
            email_verified: payload.email_verified,
            name: payload.name,
            picture: payload.picture,
        }
    }

    fn from_kakao(payload: KakaoUserPayload) -> Self {
        OAuthUserInfo {
            id: payload.id.to_string(),
            email: payload.kakao_account.email,
            email_verified: payload.kakao_account.is_email_verified,
            name: payload.kakao_account.profile.nickname,
            picture: payload.kakao_account.profile.profile_image_url,
        }
    }
}

/// The single OAuth client used for all provider calls.
#[derive(Clone)]
pub struct OAuthClient {
    client: Client,
    redirect_base: String,
    google: Option<ProviderSettings>,
    kakao: Option<ProviderSettings>,
}

impl OAuthClient {
    pub fn from_config(config: &Config) -> Self {
        let pair = |id: &Option<String>, secret: &Option<String>| match (id, secret) {
            (Some(id), Some(secret)) => Some(ProviderSettings {
                client_id: id.clone(),
                client_secret: secret.clone(),
            }),
            _ => None,
        };
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            redirect_base: config.oauth_redirect_base.clone(),
            google: pair(&config.google_client_id, &config.google_client_secret),
            kakao: pair(&config.kakao_client_id, &config.kakao_client_secret),
        }
    }

    fn settings(&self, provider: OAuthProvider) -> Result<&ProviderSettings, OAuthError> {
        let settings = match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Kakao => self.kakao.as_ref(),
        };
        settings.ok_or(OAuthError::NotConfigured(provider.as_str()))
    }

    fn redirect_uri(&self, provider: OAuthProvider) -> String {
        format!("{}/auth/callback/{}", self.redirect_base, provider.as_str())
    }

    /// Builds the provider's consent-screen URL for the login redirect.
    pub fn authorize_url(&self, provider: OAuthProvider) -> Result<String, OAuthError> {
        let settings = self.settings(provider)?;
        let (base, scope) = match provider {
            OAuthProvider::Google => (GOOGLE_AUTH_URL, GOOGLE_SCOPE),
            OAuthProvider::Kakao => (KAKAO_AUTH_URL, KAKAO_SCOPE),
        };
        let url = reqwest::Url::parse_with_params(
            base,
            &[
                ("client_id", settings.client_id.as_str()),
                ("redirect_uri", &self.redirect_uri(provider)),
                ("response_type", "code"),
                ("scope", scope),
            ],
        )
        .map_err(|e| OAuthError::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    /// Redeems an authorization code: token POST, then userinfo GET,
    /// normalized into `OAuthUserInfo`.
    pub async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<OAuthUserInfo, OAuthError> {
        let settings = self.settings(provider)?;
        let token_url = match provider {
            OAuthProvider::Google => GOOGLE_TOKEN_URL,
            OAuthProvider::Kakao => KAKAO_TOKEN_URL,
        };

        let response = self
            .client
            .post(token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", settings.client_id.as_str()),
                ("client_secret", settings.client_secret.as_str()),
                ("redirect_uri", &self.redirect_uri(provider)),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OAuthError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let token: TokenPayload = response.json().await?;

        debug!("Exchanged code with {} for an access token", provider.as_str());

        let userinfo_url = match provider {
            OAuthProvider::Google => GOOGLE_USERINFO_URL,
            OAuthProvider::Kakao => KAKAO_USERINFO_URL,
        };
        let response = self
            .client
            .get(userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OAuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let info = match provider {
            OAuthProvider::Google => OAuthUserInfo::from_google(response.json().await?),
            OAuthProvider::Kakao => OAuthUserInfo::from_kakao(response.json().await?),
        };
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_payload_maps_to_userinfo() {
        let json = r#"{
            "sub": "110248495921238986420",
            "email": "student@example.com",
            "email_verified": true,
            "name": "Jan Student",
            "picture": "https://lh3.googleusercontent.com/a/photo"
        }"#;
        let payload: GoogleUserPayload = serde_json::from_str(json).unwrap();
        let info = OAuthUserInfo::from_google(payload);
        assert_eq!(info.id, "110248495921238986420");
        assert_eq!(info.email.as_deref(), Some("student@example.com"));
        assert!(info.email_verified);
        assert_eq!(info.name.as_deref(), Some("Jan Student"));
    }

    #[test]
    fn test_google_payload_without_verification_flag() {
        let json = r#"{"sub": "123", "email": "x@example.com"}"#;
        let payload: GoogleUserPayload = serde_json::from_str(json).unwrap();
        let info = OAuthUserInfo::from_google(payload);
        assert!(!info.email_verified);
        assert!(info.name.is_none());
    }

    #[test]
    fn test_kakao_payload_maps_to_userinfo() {
        let json = r#"{
            "id": 4242424242,
            "kakao_account": {
                "email": "student@example.com",
                "is_email_verified": true,
                "profile": {
                    "nickname": "student",
                    "profile_image_url": "http://k.kakaocdn.net/img.jpg"
                }
            }
        }"#;
        let payload: KakaoUserPayload = serde_json::from_str(json).unwrap();
        let info = OAuthUserInfo::from_kakao(payload);
        assert_eq!(info.id, "4242424242");
        assert_eq!(info.email.as_deref(), Some("student@example.com"));
        assert!(info.email_verified);
        assert_eq!(info.name.as_deref(), Some("student"));
        assert_eq!(
            info.picture.as_deref(),
            Some("http://k.kakaocdn.net/img.jpg")
        );
    }

    #[test]
    fn test_kakao_payload_with_bare_account() {
        let json = r#"{"id": 7}"#;
        let payload: KakaoUserPayload = serde_json::from_str(json).unwrap();
        let info = OAuthUserInfo::from_kakao(payload);
        assert_eq!(info.id, "7");
        assert!(info.email.is_none());
        assert!(!info.email_verified);
    }

    #[test]
    fn test_authorize_url_requires_configuration() {
        let client = OAuthClient {
            client: Client::new(),
            redirect_base: "http://localhost:8080".to_string(),
            google: None,
            kakao: None,
        };
        assert!(matches!(
            client.authorize_url(OAuthProvider::Google),
            Err(OAuthError::NotConfigured("google"))
        ));
    }

    #[test]
    fn test_authorize_url_encodes_parameters() {
        let client = OAuthClient {
            client: Client::new(),
            redirect_base: "http://localhost:8080".to_string(),
            google: Some(ProviderSettings {
                client_id: "cid".to_string(),
                client_secret: "secret".to_string(),
            }),
            kakao: None,
        };
        let url = client.authorize_url(OAuthProvider::Google).unwrap();
        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=cid"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fauth%2Fcallback%2Fgoogle"));
        assert!(url.contains("scope=openid+email+profile"));
    }
}
