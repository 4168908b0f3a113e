//! Bulk import: CSV upload and place candidates
//!
//! Place import is two-step. Candidates are produced from posted search
//! result links or an Overpass preset, the admin picks some, and the
//! picked ones are saved with their category created by name if needed.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sig_common::db::import::{self, ImportSummary};
use sig_common::geo::MAP_BOUNDS;
use sig_common::places::{
    overpass_places, parse_place_links, search_url, OverpassPreset, PlaceLink, ScrapedPlace,
    SEARCH_PRESETS,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/admin/import/csv
///
/// Body is the raw CSV text.
pub async fn import_csv(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<ImportSummary>> {
    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("CSV document is empty".to_string()));
    }
    Ok(Json(import::import_csv(&state.db, &body).await))
}

#[derive(Debug, Serialize)]
pub struct SearchPreset {
    pub label: &'static str,
    pub query: &'static str,
}

/// GET /api/admin/import/presets
pub async fn list_search_presets() -> Json<Vec<SearchPreset>> {
    Json(
        SEARCH_PRESETS
            .iter()
            .map(|&(label, query)| SearchPreset { label, query })
            .collect(),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParseRequest {
    /// Result links collected from a map search
    pub links: Option<Vec<PlaceLink>>,
    /// Search text to build a map search URL for
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CandidatesResponse {
    /// Map search page to collect links from, when a query was given
    pub search_url: Option<String>,
    pub candidates: Vec<ScrapedPlace>,
}

/// POST /api/admin/import/places/parse
pub async fn parse_places(
    Json(request): Json<ParseRequest>,
) -> ApiResult<Json<CandidatesResponse>> {
    let query = request
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    if query.is_none() && request.links.is_none() {
        return Err(ApiError::BadRequest(
            "Either links or query is required".to_string(),
        ));
    }

    let prefix = format!("gmaps-{}", chrono::Utc::now().timestamp_millis());
    let candidates = request
        .links
        .as_deref()
        .map(|links| parse_place_links(links, &MAP_BOUNDS, &prefix))
        .unwrap_or_default();

    Ok(Json(CandidatesResponse {
        search_url: query.map(search_url),
        candidates,
    }))
}

#[derive(Debug, Deserialize)]
pub struct OverpassRequest {
    pub preset: OverpassPreset,
}

/// POST /api/admin/import/overpass
pub async fn fetch_overpass(
    State(state): State<AppState>,
    Json(request): Json<OverpassRequest>,
) -> ApiResult<Json<CandidatesResponse>> {
    let response = state.overpass.fetch(request.preset).await?;
    let candidates = overpass_places(&response);
    info!(
        "Overpass returned {} usable places of {} elements",
        candidates.len(),
        response.elements.len()
    );
    Ok(Json(CandidatesResponse {
        search_url: None,
        candidates,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SavePlacesRequest {
    pub places: Vec<ScrapedPlace>,
}

/// POST /api/admin/import/places/save
pub async fn save_places(
    State(state): State<AppState>,
    Json(request): Json<SavePlacesRequest>,
) -> ApiResult<Json<ImportSummary>> {
    if let Some(place) = request.places.iter().find(|p| p.name.trim().is_empty()) {
        return Err(ApiError::BadRequest(format!(
            "Place {} has no name",
            place.place_id
        )));
    }
    let records: Vec<_> = request
        .places
        .into_iter()
        .map(ScrapedPlace::into_record)
        .collect();
    Ok(Json(import::import_records(&state.db, &records).await))
}
