//! HTTP API handlers for sig-admin

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod geocode;
pub mod import;
pub mod locations;
pub mod reports;
pub mod ui;

pub use auth::{auth_middleware, login, logout};
pub use categories::{
    add_subcategory, create_category, delete_category, delete_subcategory, get_category,
    list_categories, update_category,
};
pub use dashboard::get_dashboard;
pub use geocode::{apply_coordinates, sync_coordinates};
pub use import::{fetch_overpass, import_csv, list_search_presets, parse_places, save_places};
pub use locations::{
    bulk_delete_locations, create_location, delete_filtered_locations, delete_location,
    get_location, list_locations, update_location,
};
pub use reports::{delete_report, list_reports, update_report_status};
pub use ui::{serve_admin, serve_admin_js, serve_login};
