//! Category and subcategory persistence

use crate::models::{Category, Subcategory};
use crate::{Error, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

/// Map a unique-constraint failure to `Error::Conflict`
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::Conflict(message());
        }
    }
    Error::Database(err)
}

/// All categories with their subcategories, both ordered by name
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT id, name, icon FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;

    let mut subcategories: HashMap<String, Vec<Subcategory>> = HashMap::new();
    for sub in list_subcategories(pool).await? {
        subcategories.entry(sub.category_id.clone()).or_default().push(sub);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let id: String = row.get("id");
            Category {
                subcategories: subcategories.remove(&id).unwrap_or_default(),
                id,
                name: row.get("name"),
                icon: row.get("icon"),
            }
        })
        .collect())
}

async fn list_subcategories(pool: &SqlitePool) -> Result<Vec<Subcategory>> {
    let rows = sqlx::query("SELECT id, name, category_id FROM subcategories ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Subcategory {
            id: row.get("id"),
            name: row.get("name"),
            category_id: row.get("category_id"),
        })
        .collect())
}

pub async fn get_category(pool: &SqlitePool, id: &str) -> Result<Option<Category>> {
    let row = sqlx::query("SELECT id, name, icon FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let subcategories = sqlx::query(
        "SELECT id, name, category_id FROM subcategories WHERE category_id = ? ORDER BY name",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|r| Subcategory {
        id: r.get("id"),
        name: r.get("name"),
        category_id: r.get("category_id"),
    })
    .collect();

    Ok(Some(Category {
        id: row.get("id"),
        name: row.get("name"),
        icon: row.get("icon"),
        subcategories,
    }))
}

fn required_name(name: &str, what: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput(format!("{} name is required", what)));
    }
    Ok(name.to_string())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

pub async fn create_category(
    pool: &SqlitePool,
    name: &str,
    icon: Option<&str>,
) -> Result<Category> {
    let name = required_name(name, "Category")?;
    let icon = optional_text(icon);
    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO categories (id, name, icon) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(&name)
        .bind(&icon)
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("Category '{}' already exists", name)))?;

    Ok(Category {
        id,
        name,
        icon,
        subcategories: Vec::new(),
    })
}

pub async fn update_category(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    icon: Option<&str>,
) -> Result<Category> {
    let name = required_name(name, "Category")?;
    let icon = optional_text(icon);

    let result = sqlx::query("UPDATE categories SET name = ?, icon = ? WHERE id = ?")
        .bind(&name)
        .bind(&icon)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("Category '{}' already exists", name)))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Category {}", id)));
    }

    get_category(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Category {}", id)))
}

/// Delete a category; its subcategories go with it and its locations
/// become uncategorized
pub async fn delete_category(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Category {}", id)));
    }
    Ok(())
}

pub async fn add_subcategory(
    pool: &SqlitePool,
    category_id: &str,
    name: &str,
) -> Result<Subcategory> {
    let name = required_name(name, "Subcategory")?;
    if get_category(pool, category_id).await?.is_none() {
        return Err(Error::NotFound(format!("Category {}", category_id)));
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO subcategories (id, category_id, name) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(category_id)
        .bind(&name)
        .execute(pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("Subcategory '{}' already exists", name)))?;

    Ok(Subcategory {
        id,
        name,
        category_id: category_id.to_string(),
    })
}

pub async fn delete_subcategory(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM subcategories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Subcategory {}", id)));
    }
    Ok(())
}

/// Category id for `name`, creating the category when missing
///
/// Takes a connection so imports can run it inside their row transaction.
pub async fn get_or_create_category(conn: &mut SqliteConnection, name: &str) -> Result<String> {
    let name = required_name(name, "Category")?;
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM categories WHERE name = ?")
        .bind(&name)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    // A concurrent import may have created it in the meantime
    sqlx::query("INSERT OR IGNORE INTO categories (id, name) VALUES (?, ?)")
        .bind(&id)
        .bind(&name)
        .execute(&mut *conn)
        .await?;
    let id: String = sqlx::query_scalar("SELECT id FROM categories WHERE name = ?")
        .bind(&name)
        .fetch_one(&mut *conn)
        .await?;
    tracing::debug!("Created category '{}' ({})", name, id);
    Ok(id)
}

/// Subcategory id for `name` inside a category, creating it when missing
pub async fn get_or_create_subcategory(
    conn: &mut SqliteConnection,
    category_id: &str,
    name: &str,
) -> Result<String> {
    let name = required_name(name, "Subcategory")?;
    sqlx::query("INSERT OR IGNORE INTO subcategories (id, category_id, name) VALUES (?, ?, ?)")
        .bind(Uuid::new_v4().to_string())
        .bind(category_id)
        .bind(&name)
        .execute(&mut *conn)
        .await?;

    let id: String =
        sqlx::query_scalar("SELECT id FROM subcategories WHERE category_id = ? AND name = ?")
            .bind(category_id)
            .bind(&name)
            .fetch_one(&mut *conn)
            .await?;
    Ok(id)
}

/// Whether `subcategory_id` belongs to `category_id`
pub async fn subcategory_in_category(
    conn: &mut SqliteConnection,
    subcategory_id: &str,
    category_id: &str,
) -> Result<bool> {
    let found: Option<String> =
        sqlx::query_scalar("SELECT id FROM subcategories WHERE id = ? AND category_id = ?")
            .bind(subcategory_id)
            .bind(category_id)
            .fetch_optional(conn)
            .await?;
    Ok(found.is_some())
}

pub async fn count_categories(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
