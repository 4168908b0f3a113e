//! Statistics view

use axum::{extract::State, Json};
use sig_common::stats::{compute, Statistics};

use super::locations::load_map_data;
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/statistics
///
/// Counts over all locations, independent of the active filter.
pub async fn get_statistics(State(state): State<AppState>) -> ApiResult<Json<Statistics>> {
    let (locations, categories) = load_map_data(&state).await?;
    Ok(Json(compute(&locations, &categories)))
}
