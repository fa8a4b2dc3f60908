use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project showcase entry attached to a resume. The partial unique index
/// `portfolio_one_representative` keeps `is_representative` true on at most
/// one row per `resume_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioRow {
    pub id: i32,
    pub resume_id: i32,
    pub is_representative: bool,
    pub image: Option<String>,
    pub project_url: Option<String>,
    pub project_name: String,
    pub project_intro: String,
    pub project_period: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project belonging to exactly one portfolio. Rows are dropped with
/// their portfolio via the schema's ON DELETE CASCADE.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: i32,
    pub portfolio_id: i32,
    pub project_name: String,
    pub project_period: String,
    pub project_intro: String,
    pub description: String,
    pub role: String,
    pub tech_stack: String,
    pub github_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
