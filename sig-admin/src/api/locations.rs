//! Location management
//!
//! The admin table filters by location name, category name and condition
//! label. Bulk deletes report how many rows actually went away.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sig_common::db::locations::{self, AdminLocation, LocationInput};
use sig_common::filter::AdminLocationFilter;
use sig_common::Location;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

async fn filtered_admin_locations(
    state: &AppState,
    filter: &AdminLocationFilter,
) -> ApiResult<Vec<AdminLocation>> {
    let rows = locations::list_admin_locations(&state.db).await?;
    Ok(rows
        .into_iter()
        .filter(|row| filter.matches(&row.location, row.category_name.as_deref()))
        .collect())
}

/// GET /api/admin/locations?search=&category=&condition=
///
/// Most recently updated first.
pub async fn list_locations(
    State(state): State<AppState>,
    Query(filter): Query<AdminLocationFilter>,
) -> ApiResult<Json<Vec<AdminLocation>>> {
    Ok(Json(filtered_admin_locations(&state, &filter).await?))
}

/// POST /api/admin/locations
pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<LocationInput>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    let location = locations::create_location(&state.db, &input.validate()?).await?;
    info!("Created location {} ({})", location.name, location.id);
    Ok((StatusCode::CREATED, Json(location)))
}

/// GET /api/admin/locations/:id
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Location>> {
    locations::get_location(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Location {}", id)))
}

/// PUT /api/admin/locations/:id
///
/// Replaces every field, images included.
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<LocationInput>,
) -> ApiResult<Json<Location>> {
    let location = locations::update_location(&state.db, &id, &input.validate()?).await?;
    info!("Updated location {}", id);
    Ok(Json(location))
}

/// DELETE /api/admin/locations/:id
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    locations::delete_location(&state.db, &id).await?;
    info!("Deleted location {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

/// POST /api/admin/locations/bulk-delete
pub async fn bulk_delete_locations(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let deleted = locations::delete_locations(&state.db, &request.ids).await?;
    info!("Bulk delete removed {} of {} locations", deleted, request.ids.len());
    Ok(Json(BulkDeleteResponse { deleted }))
}

/// POST /api/admin/locations/delete-filtered
///
/// Deletes whatever the same filter would currently list.
pub async fn delete_filtered_locations(
    State(state): State<AppState>,
    Json(filter): Json<AdminLocationFilter>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let ids: Vec<String> = filtered_admin_locations(&state, &filter)
        .await?
        .into_iter()
        .map(|row| row.location.id)
        .collect();
    let deleted = locations::delete_locations(&state.db, &ids).await?;
    info!("Filtered delete removed {} locations", deleted);
    Ok(Json(BulkDeleteResponse { deleted }))
}
