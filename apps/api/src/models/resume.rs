use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A student's resume shell. Portfolios, awards, and educations attach to
/// it by `resume_id`; `user_id` points at the owning account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeBasicInfoRow {
    pub id: i32,
    pub user_id: i32,
    pub profile_image: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_type: String,
    pub school: String,
    pub major: String,
    pub grade: String,
    pub period: String,
    pub short_intro: String,
    pub intro: String,
    pub age: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only award or certification record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AwardRow {
    pub id: i32,
    pub resume_id: i32,
    pub name: String,
    pub date: String,
    pub organization: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only education history record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: i32,
    pub resume_id: i32,
    pub institution: String,
    pub period: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
