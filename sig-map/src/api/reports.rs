//! Citizen condition reports

use axum::{extract::State, http::StatusCode, Json};
use sig_common::db::locations::{list_location_refs, LocationRef};
use sig_common::db::reports::{create_report, ReportInput};
use sig_common::LocationReport;
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/report-targets
///
/// Locations offered in the report form, ordered by name.
pub async fn list_report_targets(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<LocationRef>>> {
    Ok(Json(list_location_refs(&state.db).await?))
}

/// POST /api/reports
///
/// New reports always start as `pending`.
pub async fn submit_report(
    State(state): State<AppState>,
    Json(input): Json<ReportInput>,
) -> ApiResult<(StatusCode, Json<LocationReport>)> {
    let report = create_report(&state.db, &input.validate()?).await?;
    info!(
        "Report {} received for location {:?}",
        report.id, report.location_id
    );
    Ok((StatusCode::CREATED, Json(report)))
}
