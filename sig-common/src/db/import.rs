//! Bulk import of CSV rows and scraped places

use crate::csv_import::{parse_csv, ImportRecord};
use crate::db::categories::{get_or_create_category, get_or_create_subcategory};
use crate::db::locations::{get_location, insert_location, NewLocation};
use crate::models::Location;
use crate::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    /// One message per failed row
    pub errors: Vec<String>,
}

impl ImportSummary {
    fn record_failure(&mut self, message: String) {
        warn!("Import row rejected: {}", message);
        self.failed += 1;
        self.errors.push(message);
    }
}

/// Insert one record, creating its category and subcategory by name
///
/// The whole row is one transaction: a rejected row leaves no categories
/// behind.
pub async fn import_record(pool: &SqlitePool, record: &ImportRecord) -> Result<Location> {
    let mut tx = pool.begin().await?;
    let category_id = match record.category_name.as_deref() {
        Some(name) => Some(get_or_create_category(&mut tx, name).await?),
        None => None,
    };
    let subcategory_id = match (&category_id, record.subcategory_name.as_deref()) {
        (Some(category_id), Some(name)) => {
            Some(get_or_create_subcategory(&mut tx, category_id, name).await?)
        }
        _ => None,
    };

    let location = NewLocation {
        name: record.name.clone(),
        latitude: record.latitude,
        longitude: record.longitude,
        description: record.description.clone(),
        category_id,
        subcategory_id,
        condition: record.condition,
        address: record.address.clone(),
        dusun: record.dusun.clone(),
        contact: record.contact.clone(),
        images: record.images.clone(),
    };
    let id = insert_location(&mut tx, &location).await?;
    tx.commit().await?;

    get_location(pool, &id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Location {} vanished after import", id)))
}

/// Import a batch; failures are collected, never abort the batch
pub async fn import_records(pool: &SqlitePool, records: &[ImportRecord]) -> ImportSummary {
    let mut summary = ImportSummary {
        total: records.len(),
        ..Default::default()
    };
    for record in records {
        match import_record(pool, record).await {
            Ok(_) => summary.imported += 1,
            Err(e) => summary.record_failure(format!("{}: {}", record.name, e)),
        }
    }
    info!(
        "Imported {}/{} records ({} failed)",
        summary.imported, summary.total, summary.failed
    );
    summary
}

/// Parse and import a CSV document
pub async fn import_csv(pool: &SqlitePool, text: &str) -> ImportSummary {
    let rows = parse_csv(text);
    let mut summary = ImportSummary {
        total: rows.len(),
        ..Default::default()
    };

    for row in &rows {
        let record = match row.validate() {
            Ok(record) => record,
            Err(e) => {
                summary.record_failure(e.to_string());
                continue;
            }
        };
        match import_record(pool, &record).await {
            Ok(_) => summary.imported += 1,
            Err(e) => summary.record_failure(format!("line {}: {}", row.line, e)),
        }
    }

    info!(
        "CSV import: {}/{} rows imported ({} failed)",
        summary.imported, summary.total, summary.failed
    );
    summary
}
