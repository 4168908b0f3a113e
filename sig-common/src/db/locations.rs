//! Location persistence, including each location's image list

use crate::db::categories::subcategory_in_category;
use crate::geo::parse_coordinate_pair;
use crate::models::{Condition, Location};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

const LOCATION_COLUMNS: &str = "l.id, l.name, l.latitude, l.longitude, l.description, \
     l.category_id, l.subcategory_id, l.condition, l.address, l.dusun, l.contact, \
     l.created_at, l.updated_at";

/// Location form as submitted by the admin console
///
/// Coordinates come either as numbers or as one `"lat,lng"` string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationInput {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub coordinates: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub condition: Option<String>,
    pub address: Option<String>,
    pub dusun: Option<String>,
    pub contact: Option<String>,
    pub images: Vec<String>,
}

/// Validated location ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub condition: Option<Condition>,
    pub address: Option<String>,
    pub dusun: Option<String>,
    pub contact: Option<String>,
    pub images: Vec<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LocationInput {
    /// Field-level validation; category references are checked on write
    pub fn validate(self) -> Result<NewLocation> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("Location name is required".to_string()));
        }

        let (latitude, longitude) = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
            _ => self
                .coordinates
                .as_deref()
                .and_then(parse_coordinate_pair)
                .ok_or_else(|| Error::InvalidInput("Valid coordinates are required".to_string()))?,
        };

        let condition =
            Condition::parse_optional(self.condition.as_deref())?.unwrap_or(Condition::Baik);

        let category_id = clean(self.category_id);
        let subcategory_id = clean(self.subcategory_id);
        if subcategory_id.is_some() && category_id.is_none() {
            return Err(Error::InvalidInput(
                "A subcategory requires a category".to_string(),
            ));
        }

        Ok(NewLocation {
            name,
            latitude,
            longitude,
            description: clean(self.description),
            category_id,
            subcategory_id,
            condition: Some(condition),
            address: clean(self.address),
            dusun: clean(self.dusun),
            contact: clean(self.contact),
            images: self
                .images
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
        })
    }
}

/// Location row for the admin table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminLocation {
    #[serde(flatten)]
    pub location: Location,
    pub category_name: Option<String>,
}

/// Minimal location reference for pickers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRef {
    pub id: String,
    pub name: String,
}

fn location_from_row(row: &SqliteRow, images: Vec<String>) -> Location {
    let condition: Option<String> = row.get("condition");
    Location {
        id: row.get("id"),
        name: row.get("name"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        description: row.get("description"),
        category_id: row.get("category_id"),
        subcategory_id: row.get("subcategory_id"),
        // Unrecognized stored values read as "no condition"
        condition: Condition::parse_optional(condition.as_deref()).ok().flatten(),
        address: row.get("address"),
        dusun: row.get("dusun"),
        contact: row.get("contact"),
        images,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

async fn images_by_location(pool: &SqlitePool) -> Result<HashMap<String, Vec<String>>> {
    let rows = sqlx::query(
        "SELECT location_id, image_url FROM location_images ORDER BY location_id, position",
    )
    .fetch_all(pool)
    .await?;

    let mut images: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        images
            .entry(row.get("location_id"))
            .or_default()
            .push(row.get("image_url"));
    }
    Ok(images)
}

/// Every location with its images, ordered by name
pub async fn list_locations(pool: &SqlitePool) -> Result<Vec<Location>> {
    let mut images = images_by_location(pool).await?;
    let rows = sqlx::query(&format!(
        "SELECT {} FROM locations l ORDER BY l.name",
        LOCATION_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let id: String = row.get("id");
            location_from_row(row, images.remove(&id).unwrap_or_default())
        })
        .collect())
}

/// Locations with their category name, most recently updated first
pub async fn list_admin_locations(pool: &SqlitePool) -> Result<Vec<AdminLocation>> {
    let mut images = images_by_location(pool).await?;
    let rows = sqlx::query(&format!(
        "SELECT {}, c.name AS category_name FROM locations l \
         LEFT JOIN categories c ON c.id = l.category_id \
         ORDER BY l.updated_at DESC, l.name",
        LOCATION_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let id: String = row.get("id");
            AdminLocation {
                location: location_from_row(row, images.remove(&id).unwrap_or_default()),
                category_name: row.get("category_name"),
            }
        })
        .collect())
}

pub async fn get_location(pool: &SqlitePool, id: &str) -> Result<Option<Location>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM locations l WHERE l.id = ?",
        LOCATION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let images: Vec<String> = sqlx::query_scalar(
        "SELECT image_url FROM location_images WHERE location_id = ? ORDER BY position",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(location_from_row(&row, images)))
}

/// Category must exist; subcategory must belong to it
async fn check_references(conn: &mut SqliteConnection, location: &NewLocation) -> Result<()> {
    if let Some(category_id) = &location.category_id {
        let exists: Option<String> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&mut *conn)
            .await?;
        if exists.is_none() {
            return Err(Error::InvalidInput(format!("Unknown category: {}", category_id)));
        }
        if let Some(subcategory_id) = &location.subcategory_id {
            if !subcategory_in_category(conn, subcategory_id, category_id).await? {
                return Err(Error::InvalidInput(format!(
                    "Subcategory {} does not belong to category {}",
                    subcategory_id, category_id
                )));
            }
        }
    }
    Ok(())
}

async fn replace_images(
    tx: &mut Transaction<'_, Sqlite>,
    location_id: &str,
    images: &[String],
) -> Result<()> {
    sqlx::query("DELETE FROM location_images WHERE location_id = ?")
        .bind(location_id)
        .execute(&mut **tx)
        .await?;

    for (position, url) in images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO location_images (id, location_id, image_url, position) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(location_id)
        .bind(url)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn create_location(pool: &SqlitePool, location: &NewLocation) -> Result<Location> {
    let mut tx = pool.begin().await?;
    let id = insert_location(&mut tx, location).await?;
    tx.commit().await?;

    get_location(pool, &id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Location {} vanished after insert", id)))
}

/// Insert a location and its images inside `tx`, returning the new id
pub(crate) async fn insert_location(
    tx: &mut Transaction<'_, Sqlite>,
    location: &NewLocation,
) -> Result<String> {
    check_references(tx, location).await?;
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO locations (id, name, latitude, longitude, description, category_id,
            subcategory_id, condition, address, dusun, contact)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&location.name)
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(&location.description)
    .bind(&location.category_id)
    .bind(&location.subcategory_id)
    .bind(location.condition.map(|c| c.label()))
    .bind(&location.address)
    .bind(&location.dusun)
    .bind(&location.contact)
    .execute(&mut **tx)
    .await?;
    replace_images(tx, &id, &location.images).await?;
    Ok(id)
}

/// Replace every field of a location, images included
pub async fn update_location(
    pool: &SqlitePool,
    id: &str,
    location: &NewLocation,
) -> Result<Location> {
    let mut tx = pool.begin().await?;
    check_references(&mut tx, location).await?;
    let result = sqlx::query(
        r#"
        UPDATE locations SET name = ?, latitude = ?, longitude = ?, description = ?,
            category_id = ?, subcategory_id = ?, condition = ?, address = ?, dusun = ?,
            contact = ?, updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&location.name)
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(&location.description)
    .bind(&location.category_id)
    .bind(&location.subcategory_id)
    .bind(location.condition.map(|c| c.label()))
    .bind(&location.address)
    .bind(&location.dusun)
    .bind(&location.contact)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Location {}", id)));
    }
    replace_images(&mut tx, id, &location.images).await?;
    tx.commit().await?;

    get_location(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Location {}", id)))
}

pub async fn update_coordinates(
    pool: &SqlitePool,
    id: &str,
    latitude: f64,
    longitude: f64,
) -> Result<()> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(Error::InvalidInput(format!("Invalid coordinates for location {}", id)));
    }
    let result = sqlx::query(
        "UPDATE locations SET latitude = ?, longitude = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(latitude)
    .bind(longitude)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Location {}", id)));
    }
    Ok(())
}

pub async fn delete_location(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Location {}", id)));
    }
    Ok(())
}

/// Delete several locations at once, returning how many existed
pub async fn delete_locations(pool: &SqlitePool, ids: &[String]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut deleted = 0;
    for id in ids {
        deleted += sqlx::query("DELETE FROM locations WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }
    tx.commit().await?;
    Ok(deleted)
}

/// Locations citizens can report on, ordered by name
pub async fn list_location_refs(pool: &SqlitePool) -> Result<Vec<LocationRef>> {
    let rows = sqlx::query("SELECT id, name FROM locations ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| LocationRef {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}

pub async fn location_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let found: Option<String> = sqlx::query_scalar("SELECT id FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn count_locations(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
