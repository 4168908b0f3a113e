//! Database initialization and queries

pub mod categories;
pub mod import;
pub mod init;
pub mod locations;
pub mod reports;

pub use init::*;
