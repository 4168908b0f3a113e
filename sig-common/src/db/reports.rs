//! Citizen condition reports

use crate::db::locations::location_exists;
use crate::models::{Condition, LocationReport, ReportStatus};
use crate::{Error, Result};
use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use url::Url;
use uuid::Uuid;

/// Report form submitted from the public map
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportInput {
    pub location_id: Option<String>,
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub condition: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub location_id: Option<String>,
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub condition: Condition,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Photo links must be plain web URLs
fn web_url(value: Option<String>, field: &str) -> Result<Option<String>> {
    let Some(value) = optional(value) else {
        return Ok(None);
    };
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(value)),
        _ => Err(Error::InvalidInput(format!("{} must be an http(s) URL", field))),
    }
}

impl ReportInput {
    pub fn validate(self) -> Result<NewReport> {
        Ok(NewReport {
            full_name: required(&self.full_name, "full_name")?,
            address: required(&self.address, "address")?,
            phone: required(&self.phone, "phone")?,
            condition: required(&self.condition, "condition")?.parse()?,
            location_id: optional(self.location_id),
            image_url: web_url(self.image_url, "image_url")?,
            description: optional(self.description),
        })
    }
}

/// Store a new report with status `pending`
pub async fn create_report(pool: &SqlitePool, report: &NewReport) -> Result<LocationReport> {
    if let Some(location_id) = &report.location_id {
        if !location_exists(pool, location_id).await? {
            return Err(Error::InvalidInput(format!("Unknown location: {}", location_id)));
        }
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO location_reports (id, location_id, full_name, address, phone, condition,
            image_url, description, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&report.location_id)
    .bind(&report.full_name)
    .bind(&report.address)
    .bind(&report.phone)
    .bind(report.condition.label())
    .bind(&report.image_url)
    .bind(&report.description)
    .bind(ReportStatus::Pending.as_str())
    .execute(pool)
    .await?;

    get_report(pool, &id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Report {} vanished after insert", id)))
}

const REPORT_SELECT: &str = r#"
    SELECT r.id, r.location_id, l.name AS location_name, r.full_name, r.address, r.phone,
        r.condition, r.image_url, r.description, r.status, r.created_at
    FROM location_reports r
    LEFT JOIN locations l ON l.id = r.location_id
"#;

fn report_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<LocationReport> {
    let condition: String = row.get("condition");
    let status: String = row.get("status");
    Ok(LocationReport {
        id: row.get("id"),
        location_id: row.get("location_id"),
        location_name: row.get("location_name"),
        full_name: row.get("full_name"),
        address: row.get("address"),
        phone: row.get("phone"),
        condition: condition.parse()?,
        image_url: row.get("image_url"),
        description: row.get("description"),
        status: status.parse()?,
        created_at: row.get("created_at"),
    })
}

pub async fn get_report(pool: &SqlitePool, id: &str) -> Result<Option<LocationReport>> {
    let row = sqlx::query(&format!("{} WHERE r.id = ?", REPORT_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(report_from_row).transpose()
}

/// All reports, newest first
pub async fn list_reports(pool: &SqlitePool) -> Result<Vec<LocationReport>> {
    let rows = sqlx::query(&format!("{} ORDER BY r.created_at DESC, r.rowid DESC", REPORT_SELECT))
        .fetch_all(pool)
        .await?;
    rows.iter().map(report_from_row).collect()
}

pub async fn update_report_status(pool: &SqlitePool, id: &str, status: ReportStatus) -> Result<()> {
    let result = sqlx::query("UPDATE location_reports SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Report {}", id)));
    }
    Ok(())
}

pub async fn delete_report(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM location_reports WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Report {}", id)));
    }
    Ok(())
}

pub async fn count_pending_reports(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM location_reports WHERE status = ?")
        .bind(ReportStatus::Pending.as_str())
        .fetch_one(pool)
        .await?;
    Ok(count)
}
