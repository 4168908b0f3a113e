//! HTTP API handlers for sig-map

pub mod categories;
pub mod layers;
pub mod locations;
pub mod markers;
pub mod reports;
pub mod statistics;
pub mod ui;

pub use categories::{get_map_config, list_categories};
pub use layers::{get_layers, toggle_layer};
pub use locations::{fly_to_location, get_location, list_locations, search_locations};
pub use markers::{diff_markers, get_markers};
pub use reports::{list_report_targets, submit_report};
pub use statistics::get_statistics;
pub use ui::{serve_app_js, serve_index};
