use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::portfolio::{PortfolioRow, ProjectRow};
use crate::portfolio::projects::{
    create_project, delete_project, list_projects, update_project, NewProject, ProjectPatch,
};
use crate::portfolio::representative::{
    create_portfolio, delete_portfolio, list_portfolios, set_representative, update_portfolio,
    NewPortfolio, PortfolioPatch,
};
use crate::state::AppState;
use crate::upload::{discard_image, UploadForm};

#[derive(Deserialize)]
pub struct ResumeIdQuery {
    pub resume_id: i32,
}

#[derive(Deserialize)]
pub struct PortfolioIdQuery {
    pub portfolio_id: i32,
}

/// POST /portfolios (multipart: text fields plus an optional image)
pub async fn handle_create_portfolio(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PortfolioRow>), AppError> {
    let form = UploadForm::read(multipart).await?;

    // Text fields are validated before the file is stored, so a rejected
    // form never leaves a file behind.
    let mut new = NewPortfolio {
        resume_id: form.require_i32("resume_id")?,
        is_representative: form.flag("is_representative")?.unwrap_or(false),
        image: None,
        project_url: form.get("project_url").map(str::to_string),
        project_name: form.require("project_name")?.to_string(),
        project_intro: form.require("project_intro")?.to_string(),
        project_period: form.require("project_period")?.to_string(),
        role: form.require("role")?.to_string(),
    };
    new.image = form.store_image(&state.config.media_dir).await?;
    let image = new.image.clone();

    match create_portfolio(&state.db, new).await {
        Ok(row) => Ok((StatusCode::CREATED, Json(row))),
        Err(e) => {
            if let Some(path) = image.as_deref() {
                discard_image(&state.config.media_dir, path).await;
            }
            Err(e)
        }
    }
}

/// GET /portfolios?resume_id=
pub async fn handle_list_portfolios(
    State(state): State<AppState>,
    Query(query): Query<ResumeIdQuery>,
) -> Result<Json<Vec<PortfolioRow>>, AppError> {
    Ok(Json(list_portfolios(&state.db, query.resume_id).await?))
}

/// PUT /portfolios/:id (multipart; every field optional)
pub async fn handle_update_portfolio(
    State(state): State<AppState>,
    Path(portfolio_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<PortfolioRow>, AppError> {
    let form = UploadForm::read(multipart).await?;

    let mut patch = PortfolioPatch {
        is_representative: form.flag("is_representative")?,
        image: None,
        project_url: form.get("project_url").map(str::to_string),
        project_name: form.get("project_name").map(str::to_string),
        project_intro: form.get("project_intro").map(str::to_string),
        project_period: form.get("project_period").map(str::to_string),
        role: form.get("role").map(str::to_string),
    };
    patch.image = form.store_image(&state.config.media_dir).await?;
    let image = patch.image.clone();

    match update_portfolio(&state.db, portfolio_id, patch).await {
        Ok(row) => Ok(Json(row)),
        Err(e) => {
            // A miss on the target row must not orphan the stored file.
            if let Some(path) = image.as_deref() {
                discard_image(&state.config.media_dir, path).await;
            }
            Err(e)
        }
    }
}

/// PATCH /portfolios/:id/representative
pub async fn handle_set_representative(
    State(state): State<AppState>,
    Path(portfolio_id): Path<i32>,
) -> Result<Json<PortfolioRow>, AppError> {
    Ok(Json(set_representative(&state.db, portfolio_id).await?))
}

/// DELETE /portfolios/:id
pub async fn handle_delete_portfolio(
    State(state): State<AppState>,
    Path(portfolio_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_portfolio(&state.db, portfolio_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(req): Json<NewProject>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    let row = create_project(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /projects?portfolio_id=
pub async fn handle_list_projects(
    State(state): State<AppState>,
    Query(query): Query<PortfolioIdQuery>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    Ok(Json(list_projects(&state.db, query.portfolio_id).await?))
}

/// PUT /projects/:id
pub async fn handle_update_project(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ProjectRow>, AppError> {
    Ok(Json(update_project(&state.db, project_id, patch).await?))
}

/// DELETE /projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    delete_project(&state.db, project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
