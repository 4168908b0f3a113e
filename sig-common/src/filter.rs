//! Location filtering pipeline
//!
//! Turns the full location set into the set shown on the map:
//! layer (category/subcategory) selection, condition filter and free-text
//! search are combined with AND, then each surviving location is colored by
//! its category.
//!
//! The layer selection mixes subcategory ids and category ids in one set.
//! A location carrying a subcategory is matched by that subcategory only;
//! a location without one is matched by its category id. This lets a
//! category without used subcategories act as a single toggle.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{Category, Condition, Location, Subcategory};

/// Marker palette, assigned to categories by position
pub const CATEGORY_COLORS: [&str; 8] = [
    "#a5b4fc", "#f9a8d4", "#bbf7d0", "#fde68a", "#c4b5fd", "#fbcfe8", "#fed7aa", "#bae6fd",
];

/// Color for locations without a known category
pub const DEFAULT_MARKER_COLOR: &str = "#3b82f6";

/// Category id -> marker color
#[derive(Debug, Clone, Default)]
pub struct CategoryPalette {
    colors: HashMap<String, &'static str>,
}

impl CategoryPalette {
    /// Assign `CATEGORY_COLORS[i % 8]` to the category at index `i`
    pub fn new(categories: &[Category]) -> Self {
        let colors = categories
            .iter()
            .enumerate()
            .map(|(index, cat)| (cat.id.clone(), color_at(index)))
            .collect();
        Self { colors }
    }

    pub fn color_for(&self, category_id: Option<&str>) -> &'static str {
        category_id
            .and_then(|id| self.colors.get(id).copied())
            .unwrap_or(DEFAULT_MARKER_COLOR)
    }
}

/// Palette color for a category position
pub fn color_at(index: usize) -> &'static str {
    CATEGORY_COLORS[index % CATEGORY_COLORS.len()]
}

/// Location with its resolved marker color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledLocation {
    #[serde(flatten)]
    pub location: Location,
    pub color: &'static str,
}

/// Case-insensitive substring match on name, description or address
///
/// `query` must already be lowercased and trimmed; empty matches all.
fn matches_search(location: &Location, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let contains = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(query));
    contains(Some(location.name.as_str()))
        || contains(location.description.as_deref())
        || contains(location.address.as_deref())
}

fn normalize_query(search: &str) -> String {
    search.trim().to_lowercase()
}

/// Filter state of the public viewer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationFilter {
    /// Selected subcategory ids and category ids (see module docs)
    #[serde(default)]
    pub selected: BTreeSet<String>,
    #[serde(default)]
    pub conditions: BTreeSet<Condition>,
    #[serde(default)]
    pub search: String,
}

impl LocationFilter {
    pub fn matches_category(&self, location: &Location) -> bool {
        if self.selected.is_empty() {
            return true;
        }
        match (&location.subcategory_id, &location.category_id) {
            (Some(sub), _) => self.selected.contains(sub),
            (None, Some(cat)) => self.selected.contains(cat),
            (None, None) => false,
        }
    }

    pub fn matches_condition(&self, location: &Location) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        location
            .condition
            .is_some_and(|c| self.conditions.contains(&c))
    }

    pub fn matches(&self, location: &Location) -> bool {
        let query = normalize_query(&self.search);
        matches_search(location, &query)
            && self.matches_category(location)
            && self.matches_condition(location)
    }

    /// Flip one condition in the condition filter
    pub fn toggle_condition(&mut self, condition: Condition) {
        if !self.conditions.remove(&condition) {
            self.conditions.insert(condition);
        }
    }

    /// Run the pipeline: filter in input order, then color
    pub fn apply(&self, locations: &[Location], palette: &CategoryPalette) -> Vec<StyledLocation> {
        let query = normalize_query(&self.search);
        locations
            .iter()
            .filter(|loc| {
                matches_search(loc, &query)
                    && self.matches_category(loc)
                    && self.matches_condition(loc)
            })
            .map(|loc| StyledLocation {
                location: loc.clone(),
                color: palette.color_for(loc.category_id.as_deref()),
            })
            .collect()
    }
}

/// Search-panel results: nothing for a blank query
pub fn search_only<'a>(locations: &'a [Location], query: &str) -> Vec<&'a Location> {
    let query = normalize_query(query);
    if query.is_empty() {
        return Vec::new();
    }
    locations
        .iter()
        .filter(|loc| matches_search(loc, &query))
        .collect()
}

/// Subcategory ids referenced by at least one location
pub fn used_subcategory_ids<'a, I>(locations: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a Location>,
{
    locations
        .into_iter()
        .filter_map(|loc| loc.subcategory_id.clone())
        .collect()
}

/// Subcategories of `category` that are used by some location
pub fn visible_subcategories<'a>(
    category: &'a Category,
    used: &HashSet<String>,
) -> Vec<&'a Subcategory> {
    category
        .subcategories
        .iter()
        .filter(|sub| used.contains(&sub.id))
        .collect()
}

/// Tri-state of a category checkbox in the layer panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

/// Layer panel selection, editing the `selected` set of a [`LocationFilter`]
#[derive(Debug, Clone, Default)]
pub struct LayerSelection {
    selected: BTreeSet<String>,
}

impl LayerSelection {
    pub fn new(selected: BTreeSet<String>) -> Self {
        Self { selected }
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn into_selected(self) -> BTreeSet<String> {
        self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Flip a single subcategory (or category) id
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Ids switched together by the category checkbox
    ///
    /// Empty when the category has no visible subcategories.
    fn group_ids(category: &Category, used: &HashSet<String>) -> Vec<String> {
        let visible = visible_subcategories(category, used);
        if visible.is_empty() {
            return Vec::new();
        }
        visible
            .into_iter()
            .map(|sub| sub.id.clone())
            .chain(std::iter::once(category.id.clone()))
            .collect()
    }

    /// Check or uncheck a whole category
    pub fn toggle_category(&mut self, category: &Category, used: &HashSet<String>, checked: bool) {
        let group = Self::group_ids(category, used);
        if group.is_empty() {
            self.toggle(&category.id);
            return;
        }
        if checked {
            self.selected.extend(group);
        } else {
            for id in &group {
                self.selected.remove(id);
            }
        }
    }

    pub fn check_state(&self, category: &Category, used: &HashSet<String>) -> CheckState {
        let group = Self::group_ids(category, used);
        if group.is_empty() {
            return if self.is_selected(&category.id) {
                CheckState::Checked
            } else {
                CheckState::Unchecked
            };
        }
        let selected_count = group.iter().filter(|id| self.is_selected(id)).count();
        if selected_count == group.len() {
            CheckState::Checked
        } else if selected_count > 0 {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    /// Clear the layer selection
    pub fn reset(&mut self) {
        self.selected.clear();
    }
}

/// Filter used by the admin location table
///
/// Unlike the viewer filter this matches the category by *name* and only
/// searches the location name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminLocationFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
}

impl AdminLocationFilter {
    pub fn matches(&self, location: &Location, category_name: Option<&str>) -> bool {
        let search = self.search.as_deref().unwrap_or("").to_lowercase();
        let matches_search = location.name.to_lowercase().contains(&search);

        let matches_category = match self.category.as_deref().filter(|c| !c.is_empty()) {
            Some(wanted) => category_name == Some(wanted),
            None => true,
        };

        let matches_condition = match self.condition.as_deref().filter(|c| !c.is_empty()) {
            Some(wanted) => location.condition.map(|c| c.label()) == Some(wanted),
            None => true,
        };

        matches_search && matches_category && matches_condition
    }
}
