//! Talent search over student portfolios.
//!
//! One portfolio per result row. The join walks portfolio to its resume to
//! the owning user to that user's student profile, so results only ever
//! contain student accounts and the filters apply to profile fields.

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;

/// One search hit: a portfolio plus who owns it.
#[derive(Debug, Serialize, FromRow)]
pub struct TalentSummary {
    pub portfolio_id: i32,
    pub student_user_id: i32,
    pub student_email: String,
    pub course_name: String,
    pub tech_stack: String,
    pub project_name: String,
    pub project_intro: String,
    pub is_representative: bool,
    pub project_image_url: Option<String>,
}

/// Escapes LIKE metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Searches portfolios by the owning student's profile. `tech_stack` is a
/// substring match, `course_name` an exact match; both optional. Results
/// are ordered by portfolio id so paging clients see a stable sequence.
pub async fn search_talents(
    pool: &PgPool,
    tech_stack: Option<&str>,
    course_name: Option<&str>,
) -> Result<Vec<TalentSummary>, AppError> {
    let pattern = tech_stack.map(escape_like);

    Ok(sqlx::query_as::<_, TalentSummary>(
        r#"
        SELECT p.id AS portfolio_id,
               u.id AS student_user_id,
               u.email AS student_email,
               sp.course_name,
               sp.tech_stack,
               p.project_name,
               p.project_intro,
               p.is_representative,
               p.image AS project_image_url
        FROM portfolio p
        JOIN resume_basic_info r ON r.id = p.resume_id
        JOIN users u ON u.id = r.user_id
        JOIN student_profile sp ON sp.user_id = u.id
        WHERE ($1::text IS NULL OR sp.tech_stack LIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR sp.course_name = $2)
        ORDER BY p.id ASC
        "#,
    )
    .bind(pattern)
    .bind(course_name)
    .fetch_all(pool)
    .await?)
}
