//! Coordinate parsing and the fixed map frame of the village
//!
//! The map is locked to Ngabul, Tahunan, Jepara: center, zoom limits and
//! the panning bounds are compile-time constants.

use serde::{Deserialize, Serialize};

/// Map center (lat, lng)
pub const MAP_CENTER: (f64, f64) = (-6.648, 110.703);
pub const DEFAULT_ZOOM: u8 = 14;
pub const MIN_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 19;
/// Zoom level used when flying to a selected location
pub const FOCUS_ZOOM: u8 = 18;

/// Panning bounds of the viewer, also the accepted area for scraped places
pub const MAP_BOUNDS: BoundingBox = BoundingBox {
    south: -6.70,
    west: 110.65,
    north: -6.60,
    east: 110.75,
};

/// Map styles offered by the viewer: (id, display name, MapTiler style id)
pub const MAP_STYLES: [(&str, &str, &str); 5] = [
    ("streets", "Streets", "streets-v2"),
    ("outdoor", "Outdoor", "outdoor-v2"),
    ("dark", "Dark", "dataviz-dark"),
    ("light", "Light", "dataviz-light"),
    ("satellite", "Satellite", "satellite"),
];

pub const DEFAULT_MAP_STYLE: &str = "light";

/// Axis-aligned lat/lng rectangle, edges inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}

/// Parse the leading decimal number of `text`
///
/// Mirrors lenient form input: surrounding whitespace is ignored and any
/// trailing garbage after a valid number is dropped (`"-6.65abc"` -> `-6.65`).
/// Returns `None` when no digits lead the text or the value is not finite.
pub fn parse_coordinate(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'-' || bytes[exp_end] == b'+') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a combined `"lat,lng"` (or `"lat lng"`) string
///
/// Every character other than digits, `-`, `.`, `,` and whitespace is
/// stripped first, so pasted values like `"(-6.64, 110.70)"` are accepted.
pub fn parse_coordinate_pair(text: &str) -> Option<(f64, f64)> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | ',') || c.is_whitespace())
        .collect();

    let parts: Vec<&str> = if cleaned.contains(',') {
        cleaned.split(',').collect()
    } else {
        cleaned.split_whitespace().collect()
    };

    let lat = parse_coordinate(parts.first()?)?;
    let lng = parse_coordinate(parts.get(1)?)?;
    Some((lat, lng))
}

/// Clamp a requested zoom level to the viewer limits
///
/// Fractional zooms round down to their bucket; non-finite input falls
/// back to the default zoom.
pub fn clamp_zoom(zoom: f64) -> u8 {
    if !zoom.is_finite() {
        return DEFAULT_ZOOM;
    }
    zoom.floor().clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM)) as u8
}

/// Style entry exposed to the viewer
#[derive(Debug, Clone, Serialize)]
pub struct MapStyle {
    pub id: &'static str,
    pub name: &'static str,
    /// MapTiler style URL, `None` without a usable key
    pub url: Option<String>,
}

/// Static map configuration served to the viewer
#[derive(Debug, Clone, Serialize)]
pub struct MapFrame {
    pub center: (f64, f64),
    pub default_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub focus_zoom: u8,
    pub bounds: BoundingBox,
    pub default_style: &'static str,
    pub styles: Vec<MapStyle>,
    /// MapTiler style URL for the default style, `None` selects OSM tiles
    pub style_url: Option<String>,
}

impl MapFrame {
    pub fn new(maptiler_key: Option<&str>) -> Self {
        let key = usable_api_key(maptiler_key);
        Self {
            center: MAP_CENTER,
            default_zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            focus_zoom: FOCUS_ZOOM,
            bounds: MAP_BOUNDS,
            default_style: DEFAULT_MAP_STYLE,
            styles: MAP_STYLES
                .iter()
                .map(|&(id, name, _)| MapStyle {
                    id,
                    name,
                    url: key.map(|k| style_url(id, k)),
                })
                .collect(),
            style_url: key.map(|k| style_url(DEFAULT_MAP_STYLE, k)),
        }
    }
}

/// Treat empty keys and `REPLACE_ME...` placeholders as absent
pub fn usable_api_key(raw: Option<&str>) -> Option<&str> {
    let key = raw?.trim();
    if key.is_empty() || key.to_uppercase().starts_with("REPLACE_ME") {
        return None;
    }
    Some(key)
}

/// MapTiler style URL; unknown styles fall back to `streets`
pub fn style_url(style: &str, api_key: &str) -> String {
    let style_id = MAP_STYLES
        .iter()
        .find(|(id, _, _)| *id == style)
        .map(|(_, _, sid)| *sid)
        .unwrap_or(MAP_STYLES[0].2);
    format!("https://api.maptiler.com/maps/{}/style.json?key={}", style_id, api_key)
}
