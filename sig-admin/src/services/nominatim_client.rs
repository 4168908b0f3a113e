//! Nominatim geocoding client
//!
//! Looks up village place names on the public OpenStreetMap geocoder.
//! The public instance allows one request per second, enforced here with a
//! `governor` limiter shared by every caller of the client.

use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use sig_common::geo::MAP_BOUNDS;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const USER_AGENT: &str = "SIG-Ngabul-App/1.0";

/// Suffix appended to every query to keep results inside the village
const QUERY_SUFFIX: &str = "Ngabul, Tahunan, Jepara, Indonesia";

/// Search viewbox as `minLon,maxLat,maxLon,minLat`
fn viewbox() -> String {
    format!(
        "{},{},{},{}",
        MAP_BOUNDS.west, MAP_BOUNDS.north, MAP_BOUNDS.east, MAP_BOUNDS.south
    )
}

#[derive(Debug, Error)]
pub enum NominatimError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One search hit; Nominatim returns coordinates as strings
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

impl NominatimPlace {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lon = self.lon.trim().parse::<f64>().ok()?;
        (lat.is_finite() && lon.is_finite()).then_some((lat, lon))
    }
}

/// Outcome of geocoding one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodeStatus {
    Found,
    NotFound,
    Error,
}

pub struct NominatimClient {
    http_client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, NominatimError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| NominatimError::NetworkError(e.to_string()))?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(NonZeroU32::MIN));

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Free-text search scoped to the village
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<NominatimPlace>, NominatimError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/search", self.base_url);
        let q = format!("{}, {}", query.trim(), QUERY_SUFFIX);
        let limit = limit.max(1).to_string();
        let viewbox = viewbox();

        tracing::debug!(query = %q, "Querying Nominatim");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("q", q.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("viewbox", viewbox.as_str()),
                ("bounded", "0"),
                ("countrycodes", "id"),
            ])
            .send()
            .await
            .map_err(|e| NominatimError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NominatimError::ApiError(status.as_u16(), error_text));
        }

        response
            .json::<Vec<NominatimPlace>>()
            .await
            .map_err(|e| NominatimError::ParseError(e.to_string()))
    }

    /// Best match coordinates for a place name, `None` when nothing matched
    pub async fn coordinates_for(&self, name: &str) -> Result<Option<(f64, f64)>, NominatimError> {
        let places = self.search(name, 1).await?;
        Ok(places.first().and_then(NominatimPlace::coordinates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_coordinates_parse_strings() {
        let place = NominatimPlace {
            lat: "-6.6512".to_string(),
            lon: " 110.7041".to_string(),
            display_name: "Masjid".to_string(),
        };
        assert_eq!(place.coordinates(), Some((-6.6512, 110.7041)));
    }

    #[test]
    fn test_place_coordinates_reject_garbage() {
        let place = NominatimPlace {
            lat: "abc".to_string(),
            lon: "110.7".to_string(),
            display_name: String::new(),
        };
        assert_eq!(place.coordinates(), None);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&GeocodeStatus::NotFound).unwrap(),
            "\"not_found\""
        );
    }

    #[test]
    fn test_viewbox_order() {
        assert_eq!(viewbox(), "110.65,-6.6,110.75,-6.7");
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = NominatimClient::new("http://localhost:1234/").unwrap();
        assert_eq!(client.base_url, "http://localhost:1234");
    }
}
