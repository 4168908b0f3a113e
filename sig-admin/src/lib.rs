//! sig-admin library - admin console
//!
//! Cookie-protected console for maintaining the village data: location
//! and category CRUD, citizen report review, bulk import from CSV and
//! place searches, and coordinate sync against Nominatim.

use axum::Router;
use sig_common::auth::AdminCredentials;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;

use services::{NominatimClient, OverpassClient};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// The single admin account
    pub credentials: Arc<AdminCredentials>,
    /// Geocoder used by coordinate sync
    pub nominatim: Arc<NominatimClient>,
    /// POI source for place import
    pub overpass: Arc<OverpassClient>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        credentials: AdminCredentials,
        nominatim: NominatimClient,
        overpass: OverpassClient,
    ) -> Self {
        Self {
            db,
            credentials: Arc::new(credentials),
            nominatim: Arc::new(nominatim),
            overpass: Arc::new(overpass),
        }
    }
}

/// Build application router
///
/// `/admin` and `/api/admin/*` sit behind the session cookie check; the
/// login flow and health endpoint are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    // Protected routes (require admin session)
    let protected = Router::new()
        .route("/admin", get(api::serve_admin))
        .route("/static/admin.js", get(api::serve_admin_js))
        .route("/api/admin/dashboard", get(api::get_dashboard))
        .route(
            "/api/admin/locations",
            get(api::list_locations).post(api::create_location),
        )
        .route(
            "/api/admin/locations/bulk-delete",
            post(api::bulk_delete_locations),
        )
        .route(
            "/api/admin/locations/delete-filtered",
            post(api::delete_filtered_locations),
        )
        .route(
            "/api/admin/locations/:id",
            get(api::get_location)
                .put(api::update_location)
                .delete(api::delete_location),
        )
        .route(
            "/api/admin/categories",
            get(api::list_categories).post(api::create_category),
        )
        .route(
            "/api/admin/categories/:id",
            get(api::get_category)
                .put(api::update_category)
                .delete(api::delete_category),
        )
        .route(
            "/api/admin/categories/:id/subcategories",
            post(api::add_subcategory),
        )
        .route(
            "/api/admin/subcategories/:id",
            delete(api::delete_subcategory),
        )
        .route("/api/admin/reports", get(api::list_reports))
        .route(
            "/api/admin/reports/:id/status",
            put(api::update_report_status),
        )
        .route("/api/admin/reports/:id", delete(api::delete_report))
        .route("/api/admin/import/csv", post(api::import_csv))
        .route("/api/admin/import/presets", get(api::list_search_presets))
        .route("/api/admin/import/places/parse", post(api::parse_places))
        .route("/api/admin/import/overpass", post(api::fetch_overpass))
        .route("/api/admin/import/places/save", post(api::save_places))
        .route("/api/admin/geocode/sync", post(api::sync_coordinates))
        .route("/api/admin/geocode/apply", post(api::apply_coordinates))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no session)
    let public = Router::new()
        .route("/login", get(api::serve_login).post(api::login))
        .route("/logout", get(api::logout))
        .merge(sig_common::health::health_routes("sig-admin", env!("CARGO_PKG_VERSION")));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
