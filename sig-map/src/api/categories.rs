//! Map configuration and category listing

use axum::{extract::State, Json};
use sig_common::geo::MapFrame;
use sig_common::Category;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/map-config
pub async fn get_map_config(State(state): State<AppState>) -> Json<MapFrame> {
    Json(state.map_frame.as_ref().clone())
}

/// GET /api/categories
///
/// Categories with their subcategories, both ordered by name.
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = sig_common::db::categories::list_categories(&state.db).await?;
    Ok(Json(categories))
}
