//! Citizen report review

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sig_common::db::reports;
use sig_common::{LocationReport, ReportStatus};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ReportStatus,
}

/// GET /api/admin/reports
///
/// Newest first, with the reported location's name when it still exists.
pub async fn list_reports(State(state): State<AppState>) -> ApiResult<Json<Vec<LocationReport>>> {
    Ok(Json(reports::list_reports(&state.db).await?))
}

/// PUT /api/admin/reports/:id/status
pub async fn update_report_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<LocationReport>> {
    reports::update_report_status(&state.db, &id, request.status).await?;
    info!("Report {} marked {}", id, request.status.as_str());
    let report = reports::get_report(&state.db, &id)
        .await?
        .ok_or_else(|| sig_common::Error::NotFound(format!("Report {}", id)))?;
    Ok(Json(report))
}

/// DELETE /api/admin/reports/:id
pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    reports::delete_report(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
