//! Category and subcategory management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sig_common::db::categories;
use sig_common::{Category, Subcategory};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryRequest {
    pub name: String,
}

/// GET /api/admin/categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(categories::list_categories(&state.db).await?))
}

/// POST /api/admin/categories
///
/// Duplicate names are rejected with 409.
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category =
        categories::create_category(&state.db, &request.name, request.icon.as_deref()).await?;
    info!("Created category {} ({})", category.name, category.id);
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/admin/categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    categories::get_category(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Category {}", id)))
}

/// PUT /api/admin/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    let category =
        categories::update_category(&state.db, &id, &request.name, request.icon.as_deref()).await?;
    Ok(Json(category))
}

/// DELETE /api/admin/categories/:id
///
/// Locations in the category stay, uncategorized.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    categories::delete_category(&state.db, &id).await?;
    info!("Deleted category {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/categories/:id/subcategories
pub async fn add_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SubcategoryRequest>,
) -> ApiResult<(StatusCode, Json<Subcategory>)> {
    let subcategory = categories::add_subcategory(&state.db, &id, &request.name).await?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

/// DELETE /api/admin/subcategories/:id
pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    categories::delete_subcategory(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
