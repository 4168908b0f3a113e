//! CSV parsing for bulk location import
//!
//! Accepted layout, with or without a header line:
//!
//! ```text
//! name, latitude, longitude, category_name, subcategory_name, address,
//! dusun, contact, condition, description, images
//! ```
//!
//! With a header, columns are looked up by name and a single
//! `coordinates` column (`"lat,lng"`) may replace latitude/longitude.
//! `images` holds `|`-separated URLs.

use serde::Serialize;

use crate::geo::{parse_coordinate, parse_coordinate_pair};
use crate::models::Condition;
use crate::{Error, Result};

/// Positional column order used when the file has no header
const POSITIONAL_COLUMNS: [&str; 11] = [
    "name",
    "latitude",
    "longitude",
    "category_name",
    "subcategory_name",
    "address",
    "dusun",
    "contact",
    "condition",
    "description",
    "images",
];

/// Split one CSV line into trimmed fields
///
/// Double quotes group commas; `""` inside a quoted field is a literal quote.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// One parsed CSV data line, before validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvRow {
    /// 1-based line number in the non-empty line sequence
    pub line: usize,
    pub name: Option<String>,
    /// NaN when neither the numeric columns nor `coordinates` parse
    pub latitude: f64,
    pub longitude: f64,
    pub category_name: Option<String>,
    pub subcategory_name: Option<String>,
    pub address: Option<String>,
    pub dusun: Option<String>,
    pub contact: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
}

/// Validated location data with category references still by name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category_name: Option<String>,
    pub subcategory_name: Option<String>,
    pub address: Option<String>,
    pub dusun: Option<String>,
    pub contact: Option<String>,
    pub condition: Option<Condition>,
    pub description: Option<String>,
    pub images: Vec<String>,
}

impl CsvRow {
    pub fn validate(&self) -> Result<ImportRecord> {
        let name = self
            .name
            .clone()
            .ok_or_else(|| Error::InvalidInput(format!("line {}: missing name", self.line)))?;
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(Error::InvalidInput(format!(
                "line {}: invalid coordinates for '{}'",
                self.line, name
            )));
        }
        let condition = Condition::parse_optional(self.condition.as_deref())
            .map_err(|e| Error::InvalidInput(format!("line {}: {}", self.line, e)))?;

        Ok(ImportRecord {
            name,
            latitude: self.latitude,
            longitude: self.longitude,
            category_name: self.category_name.clone(),
            subcategory_name: self.subcategory_name.clone(),
            address: self.address.clone(),
            dusun: self.dusun.clone(),
            contact: self.contact.clone(),
            condition,
            description: self.description.clone(),
            images: self.images.clone(),
        })
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(String::from)
}

/// Parse a whole CSV document into rows
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let Some(first) = lines.first() else {
        return Vec::new();
    };

    let header: Vec<String> = parse_csv_line(first)
        .into_iter()
        .map(|h| h.to_lowercase())
        .collect();
    let has_header = header.iter().any(|h| h == "name")
        && header
            .iter()
            .any(|h| h == "coordinates" || h == "latitude" || h == "longitude");
    let start = usize::from(has_header);

    lines
        .iter()
        .enumerate()
        .skip(start)
        .map(|(index, line)| {
            let cols = parse_csv_line(line);
            let column = |key: &str| -> Option<String> {
                let idx = if has_header {
                    header.iter().position(|h| h == key)?
                } else {
                    POSITIONAL_COLUMNS.iter().position(|c| *c == key)?
                };
                non_empty(cols.get(idx))
            };

            let mut latitude = column("latitude")
                .and_then(|v| parse_coordinate(&v))
                .unwrap_or(f64::NAN);
            let mut longitude = column("longitude")
                .and_then(|v| parse_coordinate(&v))
                .unwrap_or(f64::NAN);
            if latitude.is_nan() || longitude.is_nan() {
                let pair = if has_header {
                    column("coordinates").and_then(|v| parse_coordinate_pair(&v))
                } else {
                    None
                };
                (latitude, longitude) = pair.unwrap_or((f64::NAN, f64::NAN));
            }

            let images = column("images")
                .map(|v| {
                    v.split('|')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();

            CsvRow {
                line: index + 1,
                name: column("name"),
                latitude,
                longitude,
                category_name: column("category_name"),
                subcategory_name: column("subcategory_name"),
                address: column("address"),
                dusun: column("dusun"),
                contact: column("contact"),
                condition: column("condition"),
                description: column("description"),
                images,
            }
        })
        .collect()
}
