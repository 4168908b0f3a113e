//! sig-map library - public map viewer
//!
//! Serves the village map page and the read API behind it: filtered and
//! colored locations, zoom-dependent marker specs, statistics, the layer
//! tree, and citizen report submission.

use axum::Router;
use sig_common::geo::MapFrame;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Map configuration, fixed for the process lifetime
    pub map_frame: Arc<MapFrame>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, maptiler_key: Option<&str>) -> Self {
        Self {
            db,
            map_frame: Arc::new(MapFrame::new(maptiler_key)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/map-config", get(api::get_map_config))
        .route("/api/categories", get(api::list_categories))
        .route("/api/locations", get(api::list_locations))
        .route("/api/locations/:id", get(api::get_location))
        .route("/api/locations/:id/fly-to", get(api::fly_to_location))
        .route("/api/search", get(api::search_locations))
        .route("/api/markers", get(api::get_markers))
        .route("/api/markers/diff", post(api::diff_markers))
        .route("/api/statistics", get(api::get_statistics))
        .route("/api/layers", get(api::get_layers))
        .route("/api/layers/toggle", post(api::toggle_layer))
        .route("/api/report-targets", get(api::list_report_targets))
        .route("/api/reports", post(api::submit_report));

    let ui = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(sig_common::health::health_routes("sig-map", env!("CARGO_PKG_VERSION")));

    Router::new()
        .merge(api)
        .merge(ui)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
