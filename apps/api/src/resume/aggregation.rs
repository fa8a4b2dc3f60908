//! Read-side assembly of a complete resume.

use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::portfolio::{PortfolioRow, ProjectRow};
use crate::models::resume::{AwardRow, EducationRow, ResumeBasicInfoRow};

/// Everything attached to one resume.
#[derive(Debug, Serialize)]
pub struct ResumeDetail {
    pub resume: ResumeBasicInfoRow,
    pub portfolios: Vec<PortfolioRow>,
    pub projects: Vec<ProjectRow>,
    pub awards: Vec<AwardRow>,
    pub educations: Vec<EducationRow>,
}

/// Loads the resume and its attached collections. Projects hang off the
/// portfolios, so they are fetched through the collected portfolio ids.
pub async fn get_resume_detail(pool: &PgPool, resume_id: i32) -> Result<ResumeDetail, AppError> {
    let resume = sqlx::query_as::<_, ResumeBasicInfoRow>(
        "SELECT * FROM resume_basic_info WHERE id = $1",
    )
    .bind(resume_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let portfolios = sqlx::query_as::<_, PortfolioRow>(
        "SELECT * FROM portfolio WHERE resume_id = $1 ORDER BY id ASC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    let portfolio_ids: Vec<i32> = portfolios.iter().map(|p| p.id).collect();
    let projects = if portfolio_ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, ProjectRow>(
            "SELECT * FROM project WHERE portfolio_id = ANY($1) ORDER BY id ASC",
        )
        .bind(&portfolio_ids)
        .fetch_all(pool)
        .await?
    };

    let awards =
        sqlx::query_as::<_, AwardRow>("SELECT * FROM award WHERE resume_id = $1 ORDER BY id ASC")
            .bind(resume_id)
            .fetch_all(pool)
            .await?;

    let educations = sqlx::query_as::<_, EducationRow>(
        "SELECT * FROM education WHERE resume_id = $1 ORDER BY id ASC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    Ok(ResumeDetail {
        resume,
        portfolios,
        projects,
        awards,
        educations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_student(pool: &PgPool, email: &str) -> i32 {
        sqlx::query_scalar(
            "INSERT INTO users (email, password_hash, user_type) \
             VALUES ($1, 'x', 'student') RETURNING id",
        )
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_resume(pool: &PgPool, user_id: i32) -> i32 {
        sqlx::query_scalar(
            r#"
            INSERT INTO resume_basic_info
                (user_id, name, email, phone, job_type, school, major, grade,
                 period, short_intro, intro)
            VALUES ($1, 'Jan', 'jan@example.com', '010-1234', 'backend',
                    'LikeLion', 'SW', '4', '2024', 'short', 'long')
            RETURNING id
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_resume_is_not_found(pool: PgPool) {
        let err = get_resume_detail(&pool, 4242).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_detail_without_portfolios_has_empty_collections(pool: PgPool) {
        let user = seed_student(&pool, "s@example.com").await;
        let resume = seed_resume(&pool, user).await;
        sqlx::query(
            "INSERT INTO award (resume_id, name, date, organization) \
             VALUES ($1, 'Grand prize', '2024-06', 'LikeLion')",
        )
        .bind(resume)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO education (resume_id, institution, period, name) \
             VALUES ($1, 'Bootcamp', '2023', 'Backend course')",
        )
        .bind(resume)
        .execute(&pool)
        .await
        .unwrap();

        let detail = get_resume_detail(&pool, resume).await.unwrap();

        assert_eq!(detail.resume.id, resume);
        assert!(detail.portfolios.is_empty());
        assert!(detail.projects.is_empty());
        assert_eq!(detail.awards.len(), 1);
        assert_eq!(detail.educations.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_detail_collects_projects_through_portfolios(pool: PgPool) {
        let user = seed_student(&pool, "s@example.com").await;
        let resume = seed_resume(&pool, user).await;
        let portfolio: i32 = sqlx::query_scalar(
            "INSERT INTO portfolio (resume_id, project_name, project_intro, project_period, role) \
             VALUES ($1, 'Shop', 'intro', '2024', 'Backend') RETURNING id",
        )
        .bind(resume)
        .fetch_one(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO project \
                 (portfolio_id, project_name, project_period, project_intro, \
                  description, role, tech_stack) \
             VALUES ($1, 'Cart', '2024', 'intro', 'desc', 'Backend', 'Rust')",
        )
        .bind(portfolio)
        .execute(&pool)
        .await
        .unwrap();

        let detail = get_resume_detail(&pool, resume).await.unwrap();

        assert_eq!(detail.portfolios.len(), 1);
        assert_eq!(detail.projects.len(), 1);
        assert_eq!(detail.projects[0].portfolio_id, portfolio);
    }
}
