//! Place candidates gathered from map search results
//!
//! The browser automation that collects result links is outside this
//! crate; it hands over `(href, label)` pairs from which coordinates,
//! names and a best-guess category are derived.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::csv_import::ImportRecord;
use crate::geo::BoundingBox;

/// At most this many result links are inspected per search
pub const MAX_PLACE_LINKS: usize = 30;

/// Address given to every scraped place
pub const VILLAGE_ADDRESS: &str = "Ngabul, Tahunan, Jepara";

static AT_COORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+)").expect("valid regex"));
static DATA_COORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").expect("valid regex"));

/// Keyword table, checked in order against the lowercased name
const CATEGORY_KEYWORDS: [(&str, &[&str]); 5] = [
    (
        "Pendidikan",
        &["sd ", "sdn ", "smp", "sma", "tk ", "paud", "sekolah", "ma ", "mts"],
    ),
    (
        "Tempat Ibadah",
        &["masjid", "mushola", "musola", "gereja", "tpq", "madin", "pondok", "pesantren"],
    ),
    (
        "Kesehatan",
        &["puskesmas", "klinik", "rumah sakit", "apotek", "bidan", "posyandu"],
    ),
    (
        "Pemerintahan",
        &["kantor", "balai", "kelurahan", "kecamatan", "desa"],
    ),
    (
        "Ekonomi",
        &["toko", "warung", "pasar", "kios", "minimarket"],
    ),
];

pub const FALLBACK_CATEGORY: &str = "Lainnya";

/// Search presets offered by the admin console: (label, query)
pub const SEARCH_PRESETS: [(&str, &str); 6] = [
    ("Pendidikan", "pendidikan sekolah"),
    ("Masjid & Mushola", "masjid mushola"),
    ("Kesehatan", "puskesmas klinik"),
    ("Kantor Pemerintah", "kantor desa kelurahan"),
    ("Toko & Warung", "toko warung"),
    ("Semua POI", "ngabul tahunan jepara"),
];

/// Raw search result link
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceLink {
    pub href: String,
    #[serde(default)]
    pub label: String,
}

/// Place candidate offered for import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPlace {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
}

impl ScrapedPlace {
    pub fn into_record(self) -> ImportRecord {
        ImportRecord {
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
            category_name: Some(self.category),
            subcategory_name: None,
            address: Some(self.address),
            dusun: None,
            contact: None,
            condition: None,
            description: None,
            images: Vec::new(),
        }
    }
}

/// Coordinates embedded in a place URL (`@lat,lng` first, then `!3d..!4d..`)
pub fn extract_coordinates(href: &str) -> Option<(f64, f64)> {
    let caps = AT_COORDS
        .captures(href)
        .or_else(|| DATA_COORDS.captures(href))?;
    let lat = caps[1].parse().ok()?;
    let lng = caps[2].parse().ok()?;
    Some((lat, lng))
}

pub fn guess_category(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Google Maps search URL for a query scoped to the village
pub fn search_url(query: &str) -> String {
    let scoped = format!("{}, {}", query.trim(), VILLAGE_ADDRESS);
    format!("https://www.google.com/maps/search/{}", urlencoding::encode(&scoped))
}

/// Turn result links into candidates inside `bounds`
///
/// `id_prefix` keeps candidate ids unique across searches.
pub fn parse_place_links(
    links: &[PlaceLink],
    bounds: &BoundingBox,
    id_prefix: &str,
) -> Vec<ScrapedPlace> {
    links
        .iter()
        .take(MAX_PLACE_LINKS)
        .enumerate()
        .filter_map(|(index, link)| {
            let label = link.label.trim();
            if label.is_empty() || link.href.trim().is_empty() {
                return None;
            }
            let (lat, lng) = extract_coordinates(&link.href)?;
            if !bounds.contains(lat, lng) {
                return None;
            }
            let name = label.lines().next().unwrap_or(label).trim().to_string();
            Some(ScrapedPlace {
                place_id: format!("{}-{}", id_prefix, index),
                category: guess_category(&name).to_string(),
                name,
                address: VILLAGE_ADDRESS.to_string(),
                latitude: lat,
                longitude: lng,
            })
        })
        .collect()
}

/// Overpass bounding box: (south, west, north, east)
pub const OVERPASS_BBOX: BoundingBox = BoundingBox {
    south: -6.78,
    west: 110.64,
    north: -6.72,
    east: 110.70,
};

/// Points-of-interest groups that can be fetched from Overpass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpassPreset {
    Education,
    Health,
    Worship,
    Government,
    Economy,
    Recreation,
    Roads,
    All,
}

impl OverpassPreset {
    /// Overpass selectors, each expanded against the bounding box
    fn selectors(self) -> &'static [&'static str] {
        match self {
            Self::Education => &[
                r#"node["amenity"="school"]"#,
                r#"way["amenity"="school"]"#,
                r#"node["amenity"="kindergarten"]"#,
                r#"way["amenity"="kindergarten"]"#,
                r#"node["amenity"="college"]"#,
                r#"way["amenity"="college"]"#,
                r#"node["building"="school"]"#,
                r#"way["building"="school"]"#,
            ],
            Self::Health => &[
                r#"node["amenity"="hospital"]"#,
                r#"way["amenity"="hospital"]"#,
                r#"node["amenity"="clinic"]"#,
                r#"way["amenity"="clinic"]"#,
                r#"node["amenity"="doctors"]"#,
                r#"node["amenity"="pharmacy"]"#,
                r#"node["healthcare"]"#,
            ],
            Self::Worship => &[
                r#"node["amenity"="place_of_worship"]"#,
                r#"way["amenity"="place_of_worship"]"#,
                r#"node["building"="mosque"]"#,
                r#"way["building"="mosque"]"#,
                r#"node["building"="church"]"#,
                r#"way["building"="church"]"#,
            ],
            Self::Government => &[
                r#"node["amenity"="townhall"]"#,
                r#"way["amenity"="townhall"]"#,
                r#"node["office"="government"]"#,
                r#"way["office"="government"]"#,
                r#"node["building"="government"]"#,
                r#"way["building"="government"]"#,
                r#"node["amenity"="community_centre"]"#,
                r#"way["amenity"="community_centre"]"#,
            ],
            Self::Economy => &[
                r#"node["amenity"="marketplace"]"#,
                r#"way["amenity"="marketplace"]"#,
                r#"node["shop"]"#,
                r#"node["amenity"="bank"]"#,
                r#"node["amenity"="atm"]"#,
            ],
            Self::Recreation => &[
                r#"node["tourism"]"#,
                r#"way["tourism"]"#,
                r#"node["leisure"="park"]"#,
                r#"way["leisure"="park"]"#,
                r#"node["leisure"="playground"]"#,
                r#"way["leisure"="playground"]"#,
            ],
            Self::Roads => &[
                r#"way["highway"="primary"]"#,
                r#"way["highway"="secondary"]"#,
                r#"way["highway"="tertiary"]"#,
            ],
            Self::All => &[
                r#"node["amenity"="school"]"#,
                r#"way["amenity"="school"]"#,
                r#"node["amenity"="kindergarten"]"#,
                r#"node["amenity"="hospital"]"#,
                r#"node["amenity"="clinic"]"#,
                r#"node["amenity"="pharmacy"]"#,
                r#"node["amenity"="place_of_worship"]"#,
                r#"way["amenity"="place_of_worship"]"#,
                r#"node["amenity"="townhall"]"#,
                r#"node["office"="government"]"#,
                r#"node["amenity"="marketplace"]"#,
                r#"node["tourism"]"#,
                r#"node["leisure"="park"]"#,
            ],
        }
    }

    /// Overpass QL query; `out center` gives ways a usable position
    pub fn query(self) -> String {
        let bbox = format!(
            "{},{},{},{}",
            OVERPASS_BBOX.south, OVERPASS_BBOX.west, OVERPASS_BBOX.north, OVERPASS_BBOX.east
        );
        let timeout = if self == Self::All { 60 } else { 30 };
        let mut query = format!("[out:json][timeout:{}];\n(\n", timeout);
        for selector in self.selectors() {
            query.push_str(&format!("  {}({});\n", selector, bbox));
        }
        query.push_str(");\nout center;\n");
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

impl OverpassElement {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(c)) => Some((c.lat, c.lon)),
            _ => None,
        }
    }

    /// Name tag, or a generic label derived from the element type
    pub fn display_name(&self) -> String {
        if let Some(name) = self.tag("name").filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let label = match (self.tag("amenity"), self.tag("building"), self.tag("leisure")) {
            (Some("school"), _, _) => "Sekolah",
            (Some("kindergarten"), _, _) => "TK/PAUD",
            (Some("hospital"), _, _) => "Rumah Sakit",
            (Some("clinic"), _, _) => "Klinik",
            (Some("pharmacy"), _, _) => "Apotek",
            (Some("place_of_worship"), _, _) => match self.tag("religion") {
                Some("muslim") => "Masjid",
                Some("christian") => "Gereja",
                _ => "Tempat Ibadah",
            },
            (_, Some("mosque"), _) => "Masjid",
            (Some("townhall"), _, _) => "Kantor Desa",
            (Some("marketplace"), _, _) => "Pasar",
            (_, _, Some("park")) => "Taman",
            _ => return format!("POI #{}", self.id),
        };
        label.to_string()
    }

    pub fn category(&self) -> &'static str {
        let amenity = self.tag("amenity").unwrap_or_default();
        let building = self.tag("building").unwrap_or_default();
        if matches!(amenity, "school" | "kindergarten" | "college") || building == "school" {
            "Pendidikan"
        } else if matches!(amenity, "hospital" | "clinic" | "pharmacy" | "doctors")
            || self.tags.contains_key("healthcare")
        {
            "Kesehatan"
        } else if amenity == "place_of_worship" || matches!(building, "mosque" | "church") {
            "Tempat Ibadah"
        } else if matches!(amenity, "townhall" | "community_centre")
            || self.tag("office") == Some("government")
            || building == "government"
        {
            "Infrastruktur"
        } else if matches!(amenity, "marketplace" | "bank" | "atm")
            || self.tags.contains_key("shop")
        {
            "Ekonomi"
        } else if self.tags.contains_key("tourism") || self.tags.contains_key("leisure") {
            "Wisata"
        } else if self.tags.contains_key("highway") {
            "Jalan"
        } else {
            FALLBACK_CATEGORY
        }
    }

    pub fn to_place(&self) -> Option<ScrapedPlace> {
        let (lat, lng) = self.position()?;
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        Some(ScrapedPlace {
            place_id: format!("osm-{}-{}", self.kind, self.id),
            name: self.display_name(),
            address: VILLAGE_ADDRESS.to_string(),
            latitude: lat,
            longitude: lng,
            category: self.category().to_string(),
        })
    }
}

/// Candidates from an Overpass response, dropping unpositioned elements
pub fn overpass_places(response: &OverpassResponse) -> Vec<ScrapedPlace> {
    response.elements.iter().filter_map(OverpassElement::to_place).collect()
}
