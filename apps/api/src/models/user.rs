#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role. Stored as the Postgres enum `user_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Company,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Company => "company",
        }
    }
}

/// Social-login provider. Stored as the Postgres enum `oauth_provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "oauth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Kakao,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Kakao => "kakao",
        }
    }
}

/// One identity record. `password_hash` is NULL for OAuth-only accounts;
/// the schema CHECK guarantees at least one credential form is present.
/// Deliberately not `Serialize`: handlers expose users via `UserResponse`.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub password_hash: Option<String>,
    pub user_type: UserType,
    pub oauth_provider: Option<OAuthProvider>,
    pub oauth_id: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentProfileRow {
    pub id: i32,
    pub user_id: i32,
    pub course_name: String,
    pub course_generation: String,
    pub tech_stack: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyProfileRow {
    pub id: i32,
    pub user_id: i32,
    pub company_name: String,
    pub industry: String,
    pub size: String,
    pub intro: Option<String>,
    pub email_verified: bool,
}
