//! Console landing stats

use axum::{extract::State, Json};
use serde::Serialize;
use sig_common::db::{categories, locations, reports};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_locations: i64,
    pub total_categories: i64,
    pub pending_reports: i64,
}

/// GET /api/admin/dashboard
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(DashboardStats {
        total_locations: locations::count_locations(&state.db).await?,
        total_categories: categories::count_categories(&state.db).await?,
        pending_reports: reports::count_pending_reports(&state.db).await?,
    }))
}
