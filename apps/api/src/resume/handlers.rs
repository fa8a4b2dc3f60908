use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::auth::token::bearer_claims;
use crate::errors::{is_foreign_key_violation, AppError};
use crate::models::resume::{AwardRow, EducationRow, ResumeBasicInfoRow};
use crate::resume::aggregation::{get_resume_detail, ResumeDetail};
use crate::state::AppState;
use crate::upload::{discard_image, UploadForm};

#[derive(Debug, Deserialize)]
pub struct NewAward {
    pub resume_id: i32,
    pub name: String,
    pub date: String,
    pub organization: String,
}

#[derive(Debug, Deserialize)]
pub struct NewEducation {
    pub resume_id: i32,
    pub institution: String,
    pub period: String,
    pub name: String,
}

/// POST /resumes/basic-info (multipart: text fields plus an optional
/// profile image). The resume belongs to the authenticated account.
pub async fn handle_create_basic_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeBasicInfoRow>), AppError> {
    let claims = bearer_claims(&headers, &state.config.jwt_secret)?;
    let user_id = claims.user_id().ok_or(AppError::Unauthenticated)?;

    let form = UploadForm::read(multipart).await?;

    // Text fields are validated before the file is stored, so a rejected
    // form never leaves a file behind.
    let name = form.require("name")?;
    let email = form.require("email")?;
    let phone = form.require("phone")?;
    let job_type = form.require("job_type")?;
    let school = form.require("school")?;
    let major = form.require("major")?;
    let grade = form.require("grade")?;
    let period = form.require("period")?;
    let short_intro = form.require("short_intro")?;
    let intro = form.require("intro")?;
    let age = form.get_i32("age")?;

    let profile_image = form.store_image(&state.config.media_dir).await?;

    let inserted = sqlx::query_as::<_, ResumeBasicInfoRow>(
        r#"
        INSERT INTO resume_basic_info
            (user_id, profile_image, name, email, phone, job_type,
             school, major, grade, period, short_intro, intro, age)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&profile_image)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(job_type)
    .bind(school)
    .bind(major)
    .bind(grade)
    .bind(period)
    .bind(short_intro)
    .bind(intro)
    .bind(age)
    .fetch_one(&state.db)
    .await;

    match inserted {
        Ok(row) => Ok((StatusCode::CREATED, Json(row))),
        Err(e) => {
            if let Some(path) = profile_image.as_deref() {
                discard_image(&state.config.media_dir, path).await;
            }
            Err(e.into())
        }
    }
}

/// GET /resumes/:resume_id/detail
pub async fn handle_resume_detail(
    State(state): State<AppState>,
    Path(resume_id): Path<i32>,
) -> Result<Json<ResumeDetail>, AppError> {
    Ok(Json(get_resume_detail(&state.db, resume_id).await?))
}

/// POST /awards
pub async fn handle_create_award(
    State(state): State<AppState>,
    Json(req): Json<NewAward>,
) -> Result<(StatusCode, Json<AwardRow>), AppError> {
    let row = sqlx::query_as::<_, AwardRow>(
        r#"
        INSERT INTO award (resume_id, name, date, organization)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(req.resume_id)
    .bind(&req.name)
    .bind(&req.date)
    .bind(&req.organization)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound(format!("Resume {} not found", req.resume_id))
        } else {
            AppError::Database(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /educations
pub async fn handle_create_education(
    State(state): State<AppState>,
    Json(req): Json<NewEducation>,
) -> Result<(StatusCode, Json<EducationRow>), AppError> {
    let row = sqlx::query_as::<_, EducationRow>(
        r#"
        INSERT INTO education (resume_id, institution, period, name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(req.resume_id)
    .bind(&req.institution)
    .bind(&req.period)
    .bind(&req.name)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            AppError::NotFound(format!("Resume {} not found", req.resume_id))
        } else {
            AppError::Database(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(row)))
}
