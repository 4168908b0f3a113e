//! Integration tests for database initialization and repositories
//!
//! Each test opens a fresh SQLite file inside its own temp directory.

use sig_common::db::categories::{
    add_subcategory, create_category, delete_category, get_or_create_category,
    get_or_create_subcategory, list_categories, update_category,
};
use sig_common::csv_import::ImportRecord;
use sig_common::db::import::{import_csv, import_record, import_records};
use sig_common::db::init::init_database;
use sig_common::db::locations::{
    create_location, delete_locations, get_location, list_admin_locations, list_locations,
    update_coordinates, update_location, LocationInput,
};
use sig_common::db::reports::{
    count_pending_reports, create_report, list_reports, update_report_status, ReportInput,
};
use sig_common::{Condition, Error, ReportStatus};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("nested").join("sig.db"))
        .await
        .unwrap();
    (dir, pool)
}

fn location_input(
    name: &str,
    category_id: Option<&str>,
    subcategory_id: Option<&str>,
) -> LocationInput {
    LocationInput {
        name: name.to_string(),
        latitude: Some(-6.65),
        longitude: Some(110.70),
        category_id: category_id.map(String::from),
        subcategory_id: subcategory_id.map(String::from),
        images: vec!["http://img/1.jpg".to_string(), "http://img/2.jpg".to_string()],
        ..Default::default()
    }
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn test_database_created_with_parent_dir() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("a").join("b").join("sig.db");
    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();
    for table in [
        "categories",
        "location_images",
        "location_reports",
        "locations",
        "subcategories",
    ] {
        assert!(tables.iter().any(|t| t == table), "missing table {}", table);
    }
}

#[tokio::test]
async fn test_database_reopen_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("sig.db");
    let pool = init_database(&db_path).await.unwrap();
    create_category(&pool, "Pendidikan", None).await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(list_categories(&pool).await.unwrap().len(), 1);
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_categories_ordered_with_subcategories() {
    let (_dir, pool) = setup().await;
    let b = create_category(&pool, "Tempat Ibadah", Some("mosque")).await.unwrap();
    let a = create_category(&pool, "Pendidikan", None).await.unwrap();
    add_subcategory(&pool, &a.id, "SMP").await.unwrap();
    add_subcategory(&pool, &a.id, "SD").await.unwrap();

    let categories = list_categories(&pool).await.unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Pendidikan", "Tempat Ibadah"]);
    let subs: Vec<&str> = categories[0].subcategories.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(subs, vec!["SD", "SMP"]);
    assert_eq!(categories[1].id, b.id);
    assert_eq!(categories[1].icon.as_deref(), Some("mosque"));
}

#[tokio::test]
async fn test_duplicate_names_conflict() {
    let (_dir, pool) = setup().await;
    let cat = create_category(&pool, "Kesehatan", None).await.unwrap();
    assert!(matches!(
        create_category(&pool, "Kesehatan", None).await,
        Err(Error::Conflict(_))
    ));

    add_subcategory(&pool, &cat.id, "Posyandu").await.unwrap();
    assert!(matches!(
        add_subcategory(&pool, &cat.id, "Posyandu").await,
        Err(Error::Conflict(_))
    ));

    let other = create_category(&pool, "Ekonomi", None).await.unwrap();
    assert!(matches!(
        update_category(&pool, &other.id, "Kesehatan", None).await,
        Err(Error::Conflict(_))
    ));
}

#[tokio::test]
async fn test_missing_category_not_found() {
    let (_dir, pool) = setup().await;
    assert!(matches!(delete_category(&pool, "nope").await, Err(Error::NotFound(_))));
    assert!(matches!(add_subcategory(&pool, "nope", "X").await, Err(Error::NotFound(_))));
    assert!(matches!(
        update_category(&pool, "nope", "X", None).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_category_uncategorizes_locations() {
    let (_dir, pool) = setup().await;
    let cat = create_category(&pool, "Pendidikan", None).await.unwrap();
    let sub = add_subcategory(&pool, &cat.id, "SD").await.unwrap();
    let input = location_input("SD 1", Some(&cat.id), Some(&sub.id));
    let location = create_location(&pool, &input.validate().unwrap()).await.unwrap();

    delete_category(&pool, &cat.id).await.unwrap();

    let reloaded = get_location(&pool, &location.id).await.unwrap().unwrap();
    assert_eq!(reloaded.category_id, None);
    assert_eq!(reloaded.subcategory_id, None);
}

#[tokio::test]
async fn test_get_or_create_reuses_existing() {
    let (_dir, pool) = setup().await;
    let mut conn = pool.acquire().await.unwrap();
    let first = get_or_create_category(&mut conn, "Ekonomi").await.unwrap();
    let second = get_or_create_category(&mut conn, " Ekonomi ").await.unwrap();
    assert_eq!(first, second);

    let sub1 = get_or_create_subcategory(&mut conn, &first, "Warung").await.unwrap();
    let sub2 = get_or_create_subcategory(&mut conn, &first, "Warung").await.unwrap();
    drop(conn);
    assert_eq!(sub1, sub2);
    assert_eq!(list_categories(&pool).await.unwrap()[0].subcategories.len(), 1);
}

// =============================================================================
// Locations
// =============================================================================

#[tokio::test]
async fn test_location_crud_with_images() {
    let (_dir, pool) = setup().await;
    let cat = create_category(&pool, "Pendidikan", None).await.unwrap();
    let created = create_location(
        &pool,
        &location_input("SD 1", Some(&cat.id), None).validate().unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(created.images.len(), 2);
    assert_eq!(created.condition, Some(Condition::Baik));
    assert!(created.created_at.is_some());

    let mut update = location_input("SD Negeri 1", Some(&cat.id), None);
    update.images = vec!["http://img/3.jpg".to_string()];
    update.condition = Some("Rusak Berat".to_string());
    let updated = update_location(&pool, &created.id, &update.validate().unwrap())
        .await
        .unwrap();
    assert_eq!(updated.name, "SD Negeri 1");
    assert_eq!(updated.images, vec!["http://img/3.jpg".to_string()]);
    assert_eq!(updated.condition, Some(Condition::RusakBerat));

    let admin = list_admin_locations(&pool).await.unwrap();
    assert_eq!(admin[0].category_name.as_deref(), Some("Pendidikan"));

    update_coordinates(&pool, &created.id, -6.66, 110.71).await.unwrap();
    let moved = get_location(&pool, &created.id).await.unwrap().unwrap();
    assert_eq!((moved.latitude, moved.longitude), (-6.66, 110.71));
}

#[tokio::test]
async fn test_subcategory_must_belong_to_category() {
    let (_dir, pool) = setup().await;
    let a = create_category(&pool, "A", None).await.unwrap();
    let b = create_category(&pool, "B", None).await.unwrap();
    let sub_b = add_subcategory(&pool, &b.id, "Sub B").await.unwrap();

    let input = location_input("X", Some(&a.id), Some(&sub_b.id)).validate().unwrap();
    assert!(matches!(create_location(&pool, &input).await, Err(Error::InvalidInput(_))));

    let unknown = location_input("X", Some("missing"), None).validate().unwrap();
    assert!(matches!(create_location(&pool, &unknown).await, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn test_bulk_delete_counts_existing() {
    let (_dir, pool) = setup().await;
    let a = create_location(&pool, &location_input("A", None, None).validate().unwrap())
        .await
        .unwrap();
    let b = create_location(&pool, &location_input("B", None, None).validate().unwrap())
        .await
        .unwrap();
    create_location(&pool, &location_input("C", None, None).validate().unwrap())
        .await
        .unwrap();

    let deleted = delete_locations(&pool, &[a.id, b.id, "ghost".to_string()])
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    let left: Vec<String> = list_locations(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(left, vec!["C".to_string()]);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_report_lifecycle() {
    let (_dir, pool) = setup().await;
    let input = location_input("Jembatan", None, None).validate().unwrap();
    let location = create_location(&pool, &input).await.unwrap();

    let form = ReportInput {
        location_id: Some(location.id.clone()),
        full_name: "Budi".to_string(),
        address: "RT 01".to_string(),
        phone: "0812".to_string(),
        condition: "Rusak Berat".to_string(),
        ..Default::default()
    };
    let report = create_report(&pool, &form.validate().unwrap()).await.unwrap();
    assert_eq!(report.status, ReportStatus::Pending);
    assert_eq!(report.location_name.as_deref(), Some("Jembatan"));
    assert_eq!(count_pending_reports(&pool).await.unwrap(), 1);

    update_report_status(&pool, &report.id, ReportStatus::Approved).await.unwrap();
    assert_eq!(count_pending_reports(&pool).await.unwrap(), 0);

    sig_common::db::locations::delete_location(&pool, &location.id).await.unwrap();
    let reports = list_reports(&pool).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].location_id, None);
    assert_eq!(reports[0].status, ReportStatus::Approved);
}

#[tokio::test]
async fn test_report_unknown_location_rejected() {
    let (_dir, pool) = setup().await;
    let form = ReportInput {
        location_id: Some("ghost".to_string()),
        full_name: "Budi".to_string(),
        address: "RT 01".to_string(),
        phone: "0812".to_string(),
        condition: "Baik".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        create_report(&pool, &form.validate().unwrap()).await,
        Err(Error::InvalidInput(_))
    ));
}

// =============================================================================
// CSV import
// =============================================================================

#[tokio::test]
async fn test_csv_import_creates_categories_and_reports_failures() {
    let (_dir, pool) = setup().await;
    let csv = "name,latitude,longitude,category_name,subcategory_name,condition,images\n\
               SD 1,-6.65,110.70,Pendidikan,SD,Baik,http://a.jpg|http://b.jpg\n\
               SD 2,-6.66,110.71,Pendidikan,SD,,\n\
               ,-6.66,110.71,Pendidikan,,,\n\
               Masjid,-6.64,110.69,Tempat Ibadah,,Hancur,\n";

    let summary = import_csv(&pool, csv).await;
    assert_eq!(summary.total, 4);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.errors.len(), 2);

    let categories = list_categories(&pool).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Pendidikan");
    assert_eq!(categories[0].subcategories.len(), 1);

    let locations = list_locations(&pool).await.unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].images.len(), 2);
    assert_eq!(locations[1].condition, None);
}

fn import_row(name: &str, category: &str, subcategory: Option<&str>) -> ImportRecord {
    ImportRecord {
        name: name.to_string(),
        latitude: -6.65,
        longitude: 110.70,
        category_name: Some(category.to_string()),
        subcategory_name: subcategory.map(str::to_string),
        address: None,
        dusun: None,
        contact: None,
        condition: None,
        description: None,
        images: Vec::new(),
    }
}

#[tokio::test]
async fn test_failed_import_row_leaves_no_categories() {
    let (_dir, pool) = setup().await;
    let rejected = import_row("Toko Baru", "Ekonomi", Some("   "));
    assert!(matches!(
        import_record(&pool, &rejected).await,
        Err(Error::InvalidInput(_))
    ));
    assert!(list_categories(&pool).await.unwrap().is_empty());
    assert!(list_locations(&pool).await.unwrap().is_empty());

    let summary = import_records(
        &pool,
        &[rejected, import_row("Warung Bu Sri", "Ekonomi", Some("Warung"))],
    )
    .await;
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.failed, 1);
    let categories = list_categories(&pool).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].subcategories.len(), 1);
}
