//! Entity models shared by the map viewer and the admin console

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Infrastructure condition of a location
///
/// Serialized with its display label, which is also the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Baik")]
    Baik,
    #[serde(rename = "Rusak Ringan")]
    RusakRingan,
    #[serde(rename = "Rusak Berat")]
    RusakBerat,
}

impl Condition {
    /// All conditions in filter display order
    pub const ALL: [Condition; 3] = [
        Condition::Baik,
        Condition::RusakRingan,
        Condition::RusakBerat,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Baik => "Baik",
            Condition::RusakRingan => "Rusak Ringan",
            Condition::RusakBerat => "Rusak Berat",
        }
    }

    /// Parse an optional free-text condition; blank means absent
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Condition>, Error> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Condition::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == normalized)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown condition: {}", s.trim())))
    }
}

/// Review status of a citizen report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(ReportStatus::Pending),
            "approved" => Ok(ReportStatus::Approved),
            "rejected" => Ok(ReportStatus::Rejected),
            other => Err(Error::InvalidInput(format!("Unknown report status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// Point of interest shown on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub condition: Option<Condition>,
    pub address: Option<String>,
    pub dusun: Option<String>,
    pub contact: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Location {
    /// Both coordinates are finite numbers
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Citizen-submitted condition report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub id: String,
    pub location_id: Option<String>,
    /// Joined location name, absent for unknown or deleted locations
    pub location_name: Option<String>,
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub condition: Condition,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub created_at: String,
}
