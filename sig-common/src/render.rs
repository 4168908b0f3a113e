//! Map marker rendering
//!
//! Builds marker descriptions from the filtered location set and keeps a
//! rendered marker layer in sync with filter and zoom changes. Marker size
//! depends only on the zoom bucket, so zooming inside a bucket is free.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::filter::StyledLocation;
use crate::geo::FOCUS_ZOOM;
use crate::models::Location;

/// Marker diameter in pixels for a zoom level
pub fn marker_size(zoom: u8) -> u32 {
    match zoom {
        0..=11 => 6,
        12..=13 => 12,
        14..=15 => 18,
        _ => 24,
    }
}

/// Everything the map needs to draw one marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub color: String,
    pub size: u32,
    /// Icon anchor, the marker center
    pub anchor: (f64, f64),
    pub popup_anchor: (f64, f64),
    /// Tooltip sits 10px above the marker edge
    pub tooltip_offset: (f64, f64),
    pub selected: bool,
    pub label: String,
}

impl MarkerSpec {
    /// `None` when the location cannot be placed on the map
    pub fn from_styled(
        styled: &StyledLocation,
        zoom: u8,
        selected_id: Option<&str>,
    ) -> Option<Self> {
        let loc = &styled.location;
        if !loc.has_valid_coordinates() {
            return None;
        }
        let size = marker_size(zoom);
        let half = f64::from(size) / 2.0;
        Some(Self {
            id: loc.id.clone(),
            lat: loc.latitude,
            lng: loc.longitude,
            color: styled.color.to_string(),
            size,
            anchor: (half, half),
            popup_anchor: (0.0, -half),
            tooltip_offset: (0.0, -half - 10.0),
            selected: selected_id == Some(loc.id.as_str()),
            label: loc.name.clone(),
        })
    }
}

/// Marker specs for a filtered set, in input order
pub fn render_markers(
    styled: &[StyledLocation],
    zoom: u8,
    selected_id: Option<&str>,
) -> Vec<MarkerSpec> {
    styled
        .iter()
        .filter_map(|s| MarkerSpec::from_styled(s, zoom, selected_id))
        .collect()
}

/// Changes to apply to the drawn map after a [`MarkerLayer::sync`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerDiff {
    pub added: Vec<MarkerSpec>,
    pub updated: Vec<MarkerSpec>,
    /// Ids of markers to take off the map, sorted
    pub removed: Vec<String>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Rendered marker set keyed by location id
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: BTreeMap<String, MarkerSpec>,
    zoom: Option<u8>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer holding markers that are already drawn, zoom unknown
    pub fn from_markers(markers: impl IntoIterator<Item = MarkerSpec>) -> Self {
        Self {
            markers: markers.into_iter().map(|m| (m.id.clone(), m)).collect(),
            zoom: None,
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn zoom(&self) -> Option<u8> {
        self.zoom
    }

    pub fn get(&self, id: &str) -> Option<&MarkerSpec> {
        self.markers.get(id)
    }

    /// Reconcile the layer with a new filtered set, zoom and selection
    ///
    /// Added and updated markers follow the order of `styled`.
    pub fn sync(
        &mut self,
        styled: &[StyledLocation],
        zoom: u8,
        selected_id: Option<&str>,
    ) -> MarkerDiff {
        let mut diff = MarkerDiff::default();
        let mut next = BTreeMap::new();

        for marker in render_markers(styled, zoom, selected_id) {
            match self.markers.remove(&marker.id) {
                None => diff.added.push(marker.clone()),
                Some(previous) if previous != marker => diff.updated.push(marker.clone()),
                Some(_) => {}
            }
            next.insert(marker.id.clone(), marker);
        }

        // Whatever was not claimed above is gone from the filtered set
        diff.removed = std::mem::take(&mut self.markers).into_keys().collect();
        self.markers = next;
        self.zoom = Some(zoom);
        diff
    }

    /// Drop every marker, returning the removed ids sorted
    pub fn clear(&mut self) -> Vec<String> {
        self.zoom = None;
        std::mem::take(&mut self.markers).into_keys().collect()
    }
}

/// Camera target when a location is selected
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlyTarget {
    pub lat: f64,
    pub lng: f64,
    pub zoom: u8,
}

pub fn fly_to(location: &Location) -> Option<FlyTarget> {
    if !location.has_valid_coordinates() {
        return None;
    }
    Some(FlyTarget {
        lat: location.latitude,
        lng: location.longitude,
        zoom: FOCUS_ZOOM,
    })
}
