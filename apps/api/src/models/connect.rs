use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A company's outreach record toward a student about one portfolio.
/// Immutable once created; `connect_request_unique_triple` forbids a second
/// row with the same (company, student, portfolio).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectRequestRow {
    pub id: i32,
    pub company_user_id: i32,
    pub student_user_id: i32,
    pub portfolio_id: i32,
    pub message: Option<String>,
    pub position: Option<String>,
    pub job_description: Option<String>,
    pub required_stack: Option<String>,
    pub career_level: Option<String>,
    pub employment_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
