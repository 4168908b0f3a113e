//! Marker rendering endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sig_common::geo::{clamp_zoom, DEFAULT_ZOOM};
use sig_common::render::{marker_size, render_markers, MarkerDiff, MarkerLayer, MarkerSpec};

use super::locations::{filtered_locations, FilterQuery};
use crate::error::ApiResult;
use crate::AppState;

/// Filter parameters plus zoom and selection
///
/// Not `#[serde(flatten)]`: query-string numbers do not survive it.
#[derive(Debug, Deserialize)]
pub struct MarkerQuery {
    /// Map zoom as reported by the client, possibly fractional
    pub zoom: Option<f64>,
    pub selected_location: Option<String>,
    pub search: Option<String>,
    pub selected: Option<String>,
    pub conditions: Option<String>,
}

impl MarkerQuery {
    fn filter(&self) -> FilterQuery {
        FilterQuery {
            search: self.search.clone(),
            selected: self.selected.clone(),
            conditions: self.conditions.clone(),
        }
    }

    fn zoom(&self) -> u8 {
        self.zoom.map_or(DEFAULT_ZOOM, clamp_zoom)
    }
}

#[derive(Debug, Serialize)]
pub struct MarkersResponse {
    /// Zoom actually used, after clamping to the map limits
    pub zoom: u8,
    pub marker_size: u32,
    pub markers: Vec<MarkerSpec>,
}

/// GET /api/markers
///
/// Marker specs for the filtered set at the given zoom.
pub async fn get_markers(
    State(state): State<AppState>,
    Query(query): Query<MarkerQuery>,
) -> ApiResult<Json<MarkersResponse>> {
    let zoom = query.zoom();
    let styled = filtered_locations(&state, &query.filter()).await?;
    let markers = render_markers(&styled, zoom, query.selected_location.as_deref());

    Ok(Json(MarkersResponse {
        zoom,
        marker_size: marker_size(zoom),
        markers,
    }))
}

/// Markers currently on the client's map plus the view it wants next
#[derive(Debug, Deserialize)]
pub struct MarkerDiffRequest {
    #[serde(default)]
    pub drawn: Vec<MarkerSpec>,
    #[serde(flatten)]
    pub view: MarkerQuery,
}

#[derive(Debug, Serialize)]
pub struct MarkerDiffResponse {
    pub zoom: u8,
    pub marker_size: u32,
    #[serde(flatten)]
    pub diff: MarkerDiff,
}

/// POST /api/markers/diff
///
/// Reconciles the client's drawn markers with the filtered set at the
/// requested zoom and selection. Zooming inside a size bucket yields an
/// empty diff.
pub async fn diff_markers(
    State(state): State<AppState>,
    Json(request): Json<MarkerDiffRequest>,
) -> ApiResult<Json<MarkerDiffResponse>> {
    let view = &request.view;
    let zoom = view.zoom();
    let styled = filtered_locations(&state, &view.filter()).await?;

    let mut layer = MarkerLayer::from_markers(request.drawn);
    let diff = layer.sync(&styled, zoom, view.selected_location.as_deref());

    Ok(Json(MarkerDiffResponse {
        zoom,
        marker_size: marker_size(zoom),
        diff,
    }))
}
