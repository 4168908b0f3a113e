//! # SIG Common Library
//!
//! Shared code for the SIG Ngabul services:
//! - Entity models and database access
//! - Location filtering pipeline and map marker rendering
//! - Statistics over the location set
//! - CSV and scraped-place import parsing
//! - Admin cookie authentication primitives
//! - Configuration loading
//! - The shared `/health` route

pub mod auth;
pub mod config;
pub mod csv_import;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod filter;
pub mod geo;
pub mod health;
pub mod models;
pub mod places;
pub mod render;
pub mod stats;

pub use error::{Error, Result};
pub use models::{Category, Condition, Location, LocationReport, ReportStatus, Subcategory};
