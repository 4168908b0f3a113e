//! Location queries for the viewer
//!
//! Filtering runs on the full location set loaded per request; the village
//! has a few hundred points at most.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sig_common::db::{categories, locations};
use sig_common::filter::{search_only, CategoryPalette, LocationFilter, StyledLocation};
use sig_common::render::{fly_to, FlyTarget};
use sig_common::{Category, Condition, Location};
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Filter parameters shared by `/api/locations` and `/api/markers`
///
/// `selected` and `conditions` are comma-separated lists.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub search: Option<String>,
    pub selected: Option<String>,
    pub conditions: Option<String>,
}

pub(crate) fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl FilterQuery {
    pub fn to_filter(&self) -> ApiResult<LocationFilter> {
        let conditions = split_list(self.conditions.as_deref())
            .map(|c| c.parse::<Condition>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(LocationFilter {
            selected: split_list(self.selected.as_deref()).map(String::from).collect(),
            conditions,
            search: self.search.clone().unwrap_or_default(),
        })
    }
}

/// Everything the filter pipeline needs, loaded in one go
pub(crate) async fn load_map_data(state: &AppState) -> ApiResult<(Vec<Location>, Vec<Category>)> {
    let locations = locations::list_locations(&state.db).await?;
    let categories = categories::list_categories(&state.db).await?;
    Ok((locations, categories))
}

pub(crate) async fn filtered_locations(
    state: &AppState,
    query: &FilterQuery,
) -> ApiResult<Vec<StyledLocation>> {
    let filter = query.to_filter()?;
    let (locations, categories) = load_map_data(state).await?;
    let palette = CategoryPalette::new(&categories);
    let styled = filter.apply(&locations, &palette);
    debug!(
        "Filter kept {} of {} locations",
        styled.len(),
        locations.len()
    );
    Ok(styled)
}

/// GET /api/locations
///
/// Filtered locations in name order, each with its category color.
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<StyledLocation>>> {
    Ok(Json(filtered_locations(&state, &query).await?))
}

/// GET /api/locations/:id
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Location>> {
    locations::get_location(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Location {}", id)))
}

/// GET /api/locations/:id/fly-to
///
/// Camera target for selecting a location on the map.
pub async fn fly_to_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<FlyTarget>> {
    let location = locations::get_location(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Location {}", id)))?;
    fly_to(&location)
        .map(Json)
        .ok_or_else(|| ApiError::Unprocessable(format!("Location {} has no valid coordinates", id)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search panel entry
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub category_id: Option<String>,
    pub color: &'static str,
}

/// GET /api/search?q=
///
/// Search panel results; a blank query returns nothing.
pub async fn search_locations(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    let (locations, categories) = load_map_data(&state).await?;
    let palette = CategoryPalette::new(&categories);
    let hits = search_only(&locations, &query.q)
        .into_iter()
        .map(|loc| SearchHit {
            id: loc.id.clone(),
            name: loc.name.clone(),
            address: loc.address.clone(),
            category_id: loc.category_id.clone(),
            color: palette.color_for(loc.category_id.as_deref()),
        })
        .collect();
    Ok(Json(hits))
}
