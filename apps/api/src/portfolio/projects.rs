//! Project records nested under a portfolio.
//!
//! No cross-row invariant lives here, so writes are single statements; the
//! schema's foreign key and ON DELETE CASCADE keep projects consistent with
//! their portfolio.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::{is_foreign_key_violation, AppError};
use crate::models::portfolio::ProjectRow;

#[derive(Debug, Deserialize)]
pub struct NewProject {
    pub portfolio_id: i32,
    pub project_name: String,
    pub project_period: String,
    pub project_intro: String,
    pub description: String,
    pub role: String,
    pub tech_stack: String,
    pub github_url: Option<String>,
}

/// Partial overwrite; `None` keeps the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    pub project_name: Option<String>,
    pub project_period: Option<String>,
    pub project_intro: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    pub tech_stack: Option<String>,
    pub github_url: Option<String>,
}

fn apply_patch(row: &mut ProjectRow, patch: ProjectPatch) {
    if let Some(v) = patch.project_name {
        row.project_name = v;
    }
    if let Some(v) = patch.project_period {
        row.project_period = v;
    }
    if let Some(v) = patch.project_intro {
        row.project_intro = v;
    }
    if let Some(v) = patch.description {
        row.description = v;
    }
    if let Some(v) = patch.role {
        row.role = v;
    }
    if let Some(v) = patch.tech_stack {
        row.tech_stack = v;
    }
    if let Some(v) = patch.github_url {
        row.github_url = Some(v);
    }
}

/// Inserts a project under a portfolio. A missing portfolio surfaces the
/// foreign-key violation as `NotFound`.
pub async fn create_project(pool: &PgPool, new: NewProject) -> Result<ProjectRow, AppError> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO project
            (portfolio_id, project_name, project_period, project_intro,
             description, role, tech_stack, github_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(new.portfolio_id)
    .bind(&new.project_name)
    .bind(&new.project_period)
    .bind(&new.project_intro)
    .bind(&new.description)
    .bind(&new.role)
    .bind(&new.tech_stack)
    .bind(&new.github_url)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound(format!("Portfolio {} not found", new.portfolio_id))
        } else {
            AppError::Database(e)
        }
    })?;

    info!(
        "Created project {} under portfolio {}",
        row.id, row.portfolio_id
    );
    Ok(row)
}

pub async fn update_project(
    pool: &PgPool,
    project_id: i32,
    patch: ProjectPatch,
) -> Result<ProjectRow, AppError> {
    let mut row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM project WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

    apply_patch(&mut row, patch);

    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        UPDATE project
        SET project_name = $2,
            project_period = $3,
            project_intro = $4,
            description = $5,
            role = $6,
            tech_stack = $7,
            github_url = $8,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(&row.project_name)
    .bind(&row.project_period)
    .bind(&row.project_intro)
    .bind(&row.description)
    .bind(&row.role)
    .bind(&row.tech_stack)
    .bind(&row.github_url)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn delete_project(pool: &PgPool, project_id: i32) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM project WHERE id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Project {project_id} not found")));
    }

    info!("Deleted project {project_id}");
    Ok(())
}

/// All projects under a portfolio, oldest id first.
pub async fn list_projects(pool: &PgPool, portfolio_id: i32) -> Result<Vec<ProjectRow>, AppError> {
    Ok(sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM project WHERE portfolio_id = $1 ORDER BY id ASC",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_row() -> ProjectRow {
        ProjectRow {
            id: 3,
            portfolio_id: 1,
            project_name: "Classifier".to_string(),
            project_period: "2024.03 - 2024.05".to_string(),
            project_intro: "Image classifier".to_string(),
            description: "CNN-based image classification service".to_string(),
            role: "Modeling".to_string(),
            tech_stack: "Python, TensorFlow".to_string(),
            github_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut row = sample_row();
        let before = row.clone();
        apply_patch(&mut row, ProjectPatch::default());
        assert_eq!(row.project_name, before.project_name);
        assert_eq!(row.description, before.description);
        assert_eq!(row.github_url, before.github_url);
    }

    #[test]
    fn test_patch_overwrites_only_provided_fields() {
        let mut row = sample_row();
        apply_patch(
            &mut row,
            ProjectPatch {
                tech_stack: Some("Rust, Axum".to_string()),
                github_url: Some("https://github.com/example/classifier".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(row.tech_stack, "Rust, Axum");
        assert_eq!(
            row.github_url.as_deref(),
            Some("https://github.com/example/classifier")
        );
        assert_eq!(row.project_name, "Classifier");
    }
}
