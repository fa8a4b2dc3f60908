//! Connect-request creation and its notification text.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::{is_foreign_key_violation, is_unique_violation, AppError};
use crate::models::connect::ConnectRequestRow;

#[derive(Debug, Deserialize)]
pub struct NewConnectRequest {
    pub company_user_id: i32,
    pub student_user_id: i32,
    pub portfolio_id: i32,
    pub message: Option<String>,
    pub position: Option<String>,
    pub job_description: Option<String>,
    pub required_stack: Option<String>,
    pub career_level: Option<String>,
    pub employment_type: Option<String>,
}

/// Records one outreach. The insert is unconditional; the unique triple
/// constraint rejects repeats and the foreign keys reject dangling ids, so
/// two companies racing on the same triple cannot both succeed.
pub async fn create_connect_request(
    pool: &PgPool,
    req: NewConnectRequest,
) -> Result<ConnectRequestRow, AppError> {
    let row = sqlx::query_as::<_, ConnectRequestRow>(
        r#"
        INSERT INTO connect_request
            (company_user_id, student_user_id, portfolio_id, message, position,
             job_description, required_stack, career_level, employment_type)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(req.company_user_id)
    .bind(req.student_user_id)
    .bind(req.portfolio_id)
    .bind(&req.message)
    .bind(&req.position)
    .bind(&req.job_description)
    .bind(&req.required_stack)
    .bind(&req.career_level)
    .bind(&req.employment_type)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::DuplicateRequest
        } else if is_foreign_key_violation(&e) {
            AppError::NotFound("Referenced user or portfolio not found".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    info!(
        "Connect request {} recorded: company {} to student {}",
        row.id, row.company_user_id, row.student_user_id
    );
    Ok(row)
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// One-line text summary for the notification channel.
pub fn format_connect_summary(row: &ConnectRequestRow) -> String {
    format!(
        "[Connect request] company {} -> student {} (portfolio {}) | position: {} | job: {} | stack: {} | career: {} | employment: {} | message: {}",
        row.company_user_id,
        row.student_user_id,
        row.portfolio_id,
        or_dash(&row.position),
        or_dash(&row.job_description),
        or_dash(&row.required_stack),
        or_dash(&row.career_level),
        or_dash(&row.employment_type),
        or_dash(&row.message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bare_request() -> ConnectRequestRow {
        ConnectRequestRow {
            id: 1,
            company_user_id: 10,
            student_user_id: 3,
            portfolio_id: 7,
            message: None,
            position: None,
            job_description: None,
            required_stack: None,
            career_level: None,
            employment_type: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_is_one_line_with_dashes_for_absent_fields() {
        let summary = format_connect_summary(&bare_request());
        assert!(!summary.contains('\n'));
        assert!(summary.starts_with("[Connect request] company 10 -> student 3 (portfolio 7)"));
        assert!(summary.contains("position: -"));
        assert!(summary.contains("message: -"));
    }

    #[test]
    fn test_summary_includes_provided_fields() {
        let mut row = bare_request();
        row.position = Some("Frontend developer".to_string());
        row.required_stack = Some("React, TypeScript".to_string());
        row.message = Some("Saw your portfolio".to_string());

        let summary = format_connect_summary(&row);
        assert!(summary.contains("position: Frontend developer"));
        assert!(summary.contains("stack: React, TypeScript"));
        assert!(summary.contains("message: Saw your portfolio"));
        assert!(summary.contains("career: -"));
    }

    async fn seed_user(pool: &PgPool, email: &str, user_type: &str) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO users (email, password_hash, user_type) \
             VALUES ($1, 'x', $2::user_type) RETURNING id",
        )
        .bind(email)
        .bind(user_type)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_portfolio(pool: &PgPool, student_id: i32) -> i32 {
        let resume_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO resume_basic_info
                (user_id, name, email, phone, job_type, school, major, grade,
                 period, short_intro, intro)
            VALUES ($1, 'Jan', 'jan@example.com', '010-1234', 'backend',
                    'LikeLion', 'SW', '4', '2024', 'short', 'long')
            RETURNING id
            "#,
        )
        .bind(student_id)
        .fetch_one(pool)
        .await
        .unwrap();

        sqlx::query_scalar(
            "INSERT INTO portfolio (resume_id, project_name, project_intro, project_period, role) \
             VALUES ($1, 'Shop', 'intro', '2024', 'Backend') RETURNING id",
        )
        .bind(resume_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn outreach(company: i32, student: i32, portfolio: i32) -> NewConnectRequest {
        NewConnectRequest {
            company_user_id: company,
            student_user_id: student,
            portfolio_id: portfolio,
            message: Some("Saw your portfolio".to_string()),
            position: None,
            job_description: None,
            required_stack: None,
            career_level: None,
            employment_type: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_repeated_outreach_is_rejected_and_keeps_one_row(pool: PgPool) {
        let company = seed_user(&pool, "hr@corp.com", "company").await;
        let student = seed_user(&pool, "s@example.com", "student").await;
        let portfolio = seed_portfolio(&pool, student).await;

        create_connect_request(&pool, outreach(company, student, portfolio))
            .await
            .unwrap();
        let err = create_connect_request(&pool, outreach(company, student, portfolio))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateRequest));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM connect_request")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_dangling_portfolio_is_not_found(pool: PgPool) {
        let company = seed_user(&pool, "hr@corp.com", "company").await;
        let student = seed_user(&pool, "s@example.com", "student").await;

        let err = create_connect_request(&pool, outreach(company, student, 4242))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
