//! Overpass API client for OpenStreetMap points of interest

use sig_common::places::{OverpassPreset, OverpassResponse};
use std::time::Duration;
use thiserror::Error;

use super::nominatim_client::USER_AGENT;

pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub struct OverpassClient {
    http_client: reqwest::Client,
    url: String,
}

impl OverpassClient {
    pub fn new(url: impl Into<String>) -> Result<Self, OverpassError> {
        // Server-side query timeout is 60s for the largest preset
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| OverpassError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    /// Run the preset query, posted form-encoded as `data=<query>`
    pub async fn fetch(&self, preset: OverpassPreset) -> Result<OverpassResponse, OverpassError> {
        let query = preset.query();
        tracing::debug!(preset = ?preset, "Querying Overpass API");

        let response = self
            .http_client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| OverpassError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OverpassError::ApiError(status.as_u16(), error_text));
        }

        let parsed: OverpassResponse = response
            .json()
            .await
            .map_err(|e| OverpassError::ParseError(e.to_string()))?;

        tracing::info!(
            preset = ?preset,
            elements = parsed.elements.len(),
            "Retrieved Overpass elements"
        );
        Ok(parsed)
    }
}
