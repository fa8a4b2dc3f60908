//! Portfolio writes and the one-representative-per-resume rule.
//!
//! Every mutation opens a transaction and first locks the owning
//! `resume_basic_info` row. That serializes representative changes per
//! resume, so "clear siblings, then set" can never interleave into two
//! representatives. The partial unique index `portfolio_one_representative`
//! backs the same rule at the schema level.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioRow;

/// Fields for a new portfolio entry.
#[derive(Debug)]
pub struct NewPortfolio {
    pub resume_id: i32,
    pub is_representative: bool,
    pub image: Option<String>,
    pub project_url: Option<String>,
    pub project_name: String,
    pub project_intro: String,
    pub project_period: String,
    pub role: String,
}

/// Partial overwrite of an existing entry. `None` keeps the stored value;
/// `image`/`project_url` can be replaced but not cleared, matching the
/// create form.
#[derive(Debug, Default)]
pub struct PortfolioPatch {
    pub is_representative: Option<bool>,
    pub image: Option<String>,
    pub project_url: Option<String>,
    pub project_name: Option<String>,
    pub project_intro: Option<String>,
    pub project_period: Option<String>,
    pub role: Option<String>,
}

/// Folds a patch into the stored row.
fn apply_patch(row: &mut PortfolioRow, patch: PortfolioPatch) {
    if let Some(v) = patch.is_representative {
        row.is_representative = v;
    }
    if let Some(v) = patch.image {
        row.image = Some(v);
    }
    if let Some(v) = patch.project_url {
        row.project_url = Some(v);
    }
    if let Some(v) = patch.project_name {
        row.project_name = v;
    }
    if let Some(v) = patch.project_intro {
        row.project_intro = v;
    }
    if let Some(v) = patch.project_period {
        row.project_period = v;
    }
    if let Some(v) = patch.role {
        row.role = v;
    }
}

/// Locks the parent resume row for the rest of the transaction.
/// Doubles as the existence check.
async fn lock_resume(
    tx: &mut Transaction<'_, Postgres>,
    resume_id: i32,
) -> Result<(), AppError> {
    let locked: Option<i32> =
        sqlx::query_scalar("SELECT id FROM resume_basic_info WHERE id = $1 FOR UPDATE")
            .bind(resume_id)
            .fetch_optional(&mut **tx)
            .await?;
    locked.ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
    Ok(())
}

/// Maps a portfolio id to its resume id. Portfolios never move between
/// resumes, so this read does not need the lock.
async fn resolve_resume_id(
    tx: &mut Transaction<'_, Postgres>,
    portfolio_id: i32,
) -> Result<i32, AppError> {
    let resume_id: Option<i32> = sqlx::query_scalar("SELECT resume_id FROM portfolio WHERE id = $1")
        .bind(portfolio_id)
        .fetch_optional(&mut **tx)
        .await?;
    resume_id.ok_or_else(|| AppError::NotFound(format!("Portfolio {portfolio_id} not found")))
}

/// Demotes whichever sibling currently holds the flag. Callers hold the
/// resume lock.
async fn clear_representative(
    tx: &mut Transaction<'_, Postgres>,
    resume_id: i32,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE portfolio
        SET is_representative = FALSE, updated_at = now()
        WHERE resume_id = $1 AND is_representative
        "#,
    )
    .bind(resume_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Inserts a portfolio under a resume. A representative insert demotes the
/// current holder in the same transaction.
pub async fn create_portfolio(pool: &PgPool, new: NewPortfolio) -> Result<PortfolioRow, AppError> {
    let mut tx = pool.begin().await?;
    lock_resume(&mut tx, new.resume_id).await?;

    if new.is_representative {
        clear_representative(&mut tx, new.resume_id).await?;
    }

    let row = sqlx::query_as::<_, PortfolioRow>(
        r#"
        INSERT INTO portfolio
            (resume_id, is_representative, image, project_url,
             project_name, project_intro, project_period, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(new.resume_id)
    .bind(new.is_representative)
    .bind(&new.image)
    .bind(&new.project_url)
    .bind(&new.project_name)
    .bind(&new.project_intro)
    .bind(&new.project_period)
    .bind(&new.role)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Created portfolio {} for resume {}", row.id, row.resume_id);
    Ok(row)
}

/// Promotes one portfolio to representative, demoting any sibling.
pub async fn set_representative(pool: &PgPool, portfolio_id: i32) -> Result<PortfolioRow, AppError> {
    let mut tx = pool.begin().await?;
    let resume_id = resolve_resume_id(&mut tx, portfolio_id).await?;
    lock_resume(&mut tx, resume_id).await?;

    clear_representative(&mut tx, resume_id).await?;

    let row = sqlx::query_as::<_, PortfolioRow>(
        r#"
        UPDATE portfolio
        SET is_representative = TRUE, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(portfolio_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Portfolio {portfolio_id} not found")))?;

    tx.commit().await?;

    info!(
        "Portfolio {} is now representative for resume {}",
        row.id, row.resume_id
    );
    Ok(row)
}

/// Applies a partial update. `is_representative: true` runs the same
/// demote-then-set sequence as `set_representative`.
pub async fn update_portfolio(
    pool: &PgPool,
    portfolio_id: i32,
    patch: PortfolioPatch,
) -> Result<PortfolioRow, AppError> {
    let mut tx = pool.begin().await?;
    let resume_id = resolve_resume_id(&mut tx, portfolio_id).await?;
    lock_resume(&mut tx, resume_id).await?;

    // Re-read under the lock; concurrent writers for this resume are now
    // queued behind us.
    let mut row = sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolio WHERE id = $1")
        .bind(portfolio_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Portfolio {portfolio_id} not found")))?;

    if patch.is_representative == Some(true) && !row.is_representative {
        clear_representative(&mut tx, resume_id).await?;
    }
    apply_patch(&mut row, patch);

    let row = sqlx::query_as::<_, PortfolioRow>(
        r#"
        UPDATE portfolio
        SET is_representative = $2,
            image = $3,
            project_url = $4,
            project_name = $5,
            project_intro = $6,
            project_period = $7,
            role = $8,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(row.id)
    .bind(row.is_representative)
    .bind(&row.image)
    .bind(&row.project_url)
    .bind(&row.project_name)
    .bind(&row.project_intro)
    .bind(&row.project_period)
    .bind(&row.role)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

/// Removes a portfolio. The schema cascades the delete to its projects.
pub async fn delete_portfolio(pool: &PgPool, portfolio_id: i32) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    let resume_id = resolve_resume_id(&mut tx, portfolio_id).await?;
    lock_resume(&mut tx, resume_id).await?;

    let result = sqlx::query("DELETE FROM portfolio WHERE id = $1")
        .bind(portfolio_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Portfolio {portfolio_id} not found"
        )));
    }

    tx.commit().await?;

    info!("Deleted portfolio {portfolio_id}");
    Ok(())
}

/// All portfolios under a resume, oldest id first.
pub async fn list_portfolios(pool: &PgPool, resume_id: i32) -> Result<Vec<PortfolioRow>, AppError> {
    Ok(sqlx::query_as::<_, PortfolioRow>(
        "SELECT * FROM portfolio WHERE resume_id = $1 ORDER BY id ASC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?)
}
