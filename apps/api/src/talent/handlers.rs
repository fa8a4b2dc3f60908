use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::models::connect::ConnectRequestRow;
use crate::state::AppState;
use crate::talent::connect::{create_connect_request, format_connect_summary, NewConnectRequest};
use crate::talent::search::{search_talents, TalentSummary};

#[derive(Debug, Deserialize)]
pub struct TalentQuery {
    pub tech_stack: Option<String>,
    pub course_name: Option<String>,
}

/// GET /talents?tech_stack=&course_name=
pub async fn handle_search_talents(
    State(state): State<AppState>,
    Query(query): Query<TalentQuery>,
) -> Result<Json<Vec<TalentSummary>>, AppError> {
    let results = search_talents(
        &state.db,
        query.tech_stack.as_deref(),
        query.course_name.as_deref(),
    )
    .await?;
    Ok(Json(results))
}

/// POST /talents/connect-request
/// The notification runs detached; its outcome never changes the response.
pub async fn handle_create_connect_request(
    State(state): State<AppState>,
    Json(req): Json<NewConnectRequest>,
) -> Result<(StatusCode, Json<ConnectRequestRow>), AppError> {
    let row = create_connect_request(&state.db, req).await?;

    let summary = format_connect_summary(&row);
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&summary).await {
            warn!("Connect request notification failed: {e:?}");
        }
    });

    Ok((StatusCode::CREATED, Json(row)))
}
