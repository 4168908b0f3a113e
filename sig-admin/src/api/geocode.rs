//! Coordinate sync against Nominatim
//!
//! Sync only proposes coordinates; nothing is written until the admin
//! posts the accepted ones to `apply`. Lookups go out one per second.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sig_common::db::locations;
use sig_common::Location;
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::services::GeocodeStatus;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SyncRequest {
    /// Locations to look up; all when absent
    pub ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub location_id: String,
    pub location_name: String,
    pub old_latitude: f64,
    pub old_longitude: f64,
    pub new_latitude: Option<f64>,
    pub new_longitude: Option<f64>,
    pub status: GeocodeStatus,
}

async fn lookup(state: &AppState, location: Location) -> SyncResult {
    let (status, found) = match state.nominatim.coordinates_for(&location.name).await {
        Ok(Some(coords)) => (GeocodeStatus::Found, Some(coords)),
        Ok(None) => (GeocodeStatus::NotFound, None),
        Err(e) => {
            warn!("Geocoding {} failed: {}", location.name, e);
            (GeocodeStatus::Error, None)
        }
    };

    SyncResult {
        location_id: location.id,
        location_name: location.name,
        old_latitude: location.latitude,
        old_longitude: location.longitude,
        new_latitude: found.map(|(lat, _)| lat),
        new_longitude: found.map(|(_, lng)| lng),
        status,
    }
}

/// POST /api/admin/geocode/sync
///
/// Unknown ids are skipped.
pub async fn sync_coordinates(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> ApiResult<Json<Vec<SyncResult>>> {
    let mut targets = locations::list_locations(&state.db).await?;
    if let Some(ids) = &request.ids {
        targets.retain(|loc| ids.contains(&loc.id));
    }

    info!("Geocoding {} locations", targets.len());
    let mut results = Vec::with_capacity(targets.len());
    for location in targets {
        results.push(lookup(&state, location).await);
    }
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct CoordinateUpdate {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub updates: Vec<CoordinateUpdate>,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub updated: usize,
}

/// POST /api/admin/geocode/apply
///
/// Stops at the first unknown location; earlier updates stay applied.
pub async fn apply_coordinates(
    State(state): State<AppState>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<Json<ApplyResponse>> {
    for update in &request.updates {
        locations::update_coordinates(&state.db, &update.id, update.latitude, update.longitude)
            .await?;
    }
    info!("Applied {} coordinate updates", request.updates.len());
    Ok(Json(ApplyResponse {
        updated: request.updates.len(),
    }))
}
