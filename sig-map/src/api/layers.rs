//! Layer panel: category tree with checkbox states
//!
//! Only subcategories used by at least one location are shown. The
//! selection itself lives in the browser and is echoed back on every call.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sig_common::filter::{
    used_subcategory_ids, visible_subcategories, CategoryPalette, CheckState, LayerSelection,
};
use sig_common::{Category, Location};
use std::collections::{BTreeSet, HashSet};

use super::locations::{load_map_data, split_list};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SubcategoryNode {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: &'static str,
    pub state: CheckState,
    pub subcategories: Vec<SubcategoryNode>,
}

#[derive(Debug, Serialize)]
pub struct LayersResponse {
    pub selected: BTreeSet<String>,
    pub categories: Vec<CategoryNode>,
}

fn layer_tree(
    selection: LayerSelection,
    locations: &[Location],
    categories: &[Category],
) -> LayersResponse {
    let used = used_subcategory_ids(locations);
    let palette = CategoryPalette::new(categories);
    let nodes = categories
        .iter()
        .map(|cat| CategoryNode {
            id: cat.id.clone(),
            name: cat.name.clone(),
            icon: cat.icon.clone(),
            color: palette.color_for(Some(cat.id.as_str())),
            state: selection.check_state(cat, &used),
            subcategories: visible_subcategories(cat, &used)
                .into_iter()
                .map(|sub| SubcategoryNode {
                    id: sub.id.clone(),
                    name: sub.name.clone(),
                    selected: selection.is_selected(&sub.id),
                })
                .collect(),
        })
        .collect();

    LayersResponse {
        selected: selection.into_selected(),
        categories: nodes,
    }
}

#[derive(Debug, Deserialize)]
pub struct LayersQuery {
    pub selected: Option<String>,
}

/// GET /api/layers?selected=a,b
pub async fn get_layers(
    State(state): State<AppState>,
    Query(query): Query<LayersQuery>,
) -> ApiResult<Json<LayersResponse>> {
    let selection = LayerSelection::new(
        split_list(query.selected.as_deref())
            .map(String::from)
            .collect(),
    );
    let (locations, categories) = load_map_data(&state).await?;
    Ok(Json(layer_tree(selection, &locations, &categories)))
}

/// One edit to the layer selection
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerAction {
    /// Flip one subcategory (or a category without visible subcategories)
    Toggle { id: String },
    /// Category checkbox
    Category { id: String, checked: bool },
    Reset,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub selected: BTreeSet<String>,
    pub action: LayerAction,
}

fn apply_action(
    selection: &mut LayerSelection,
    action: &LayerAction,
    categories: &[Category],
    used: &HashSet<String>,
) -> ApiResult<()> {
    match action {
        LayerAction::Toggle { id } => selection.toggle(id),
        LayerAction::Category { id, checked } => {
            let category = categories
                .iter()
                .find(|c| &c.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("Category {}", id)))?;
            selection.toggle_category(category, used, *checked);
        }
        LayerAction::Reset => selection.reset(),
    }
    Ok(())
}

/// POST /api/layers/toggle
///
/// Applies one action to the posted selection and returns the new tree.
pub async fn toggle_layer(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<LayersResponse>> {
    let (locations, categories) = load_map_data(&state).await?;
    let used = used_subcategory_ids(&locations);
    let mut selection = LayerSelection::new(request.selected);
    apply_action(&mut selection, &request.action, &categories, &used)?;
    Ok(Json(layer_tree(selection, &locations, &categories)))
}
