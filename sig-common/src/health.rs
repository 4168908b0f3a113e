//! `/health` route shared by both services

use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn ok(module: &'static str, version: &'static str) -> Self {
        Self {
            status: "ok",
            module,
            version,
        }
    }
}

/// GET /health for a service; pass the caller's `CARGO_PKG_VERSION`
pub fn health_routes<S>(module: &'static str, version: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/health",
        get(move || async move { Json(HealthResponse::ok(module, version)) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_body() {
        let body = serde_json::to_value(HealthResponse::ok("sig-map", "0.1.0")).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["module"], "sig-map");
        assert_eq!(body["version"], "0.1.0");
    }
}
