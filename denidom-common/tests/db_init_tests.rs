//! Database initialization tests
//!
//! - First run creates the file, schema, reference rows and default settings
//! - Reopening an existing file is idempotent (no duplicate seed rows)
//! - Foreign keys cascade from projects to estimates

use denidom_common::db::init::{init_database, init_memory_database};
use denidom_common::db::seed::{material_seed_count, normative_seed_count};
use denidom_common::db::settings::{get_setting, KEY_INCLUDE_VAT, KEY_OVERHEAD_RATE};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("denidom.db");
    assert!(!db_path.exists());

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_reference_data_seeded() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("denidom.db")).await.unwrap();

    let normatives: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM normatives")
        .fetch_one(&pool)
        .await
        .unwrap();
    let materials: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM materials")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(normatives as usize, normative_seed_count());
    assert_eq!(materials as usize, material_seed_count());
}

#[tokio::test]
async fn test_reopen_does_not_duplicate_seed() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("denidom.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await.unwrap();
    let normatives: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM normatives")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(normatives as usize, normative_seed_count());
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let pool = init_memory_database().await.unwrap();

    assert_eq!(
        get_setting(&pool, KEY_OVERHEAD_RATE).await.unwrap().as_deref(),
        Some("0.12")
    );
    assert_eq!(
        get_setting(&pool, KEY_INCLUDE_VAT).await.unwrap().as_deref(),
        Some("true")
    );
}

#[tokio::test]
async fn test_project_delete_cascades_to_estimates() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, password_salt) VALUES ('u1', 'a@b.ru', 'A', 'h', 's')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO projects (id, owner_id, name) VALUES ('p1', 'u1', 'Дом')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO estimates (id, project_id, number, name) VALUES ('e1', 'p1', 'СМ-1', 'Смета')")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM projects WHERE id = 'p1'")
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM estimates")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_client_delete_detaches_projects() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, password_salt) VALUES ('u1', 'a@b.ru', 'A', 'h', 's')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO clients (id, owner_id, name) VALUES ('c1', 'u1', 'ООО Ромашка')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO projects (id, owner_id, client_id, name) VALUES ('p1', 'u1', 'c1', 'Офис')")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM clients WHERE id = 'c1'")
        .execute(&pool)
        .await
        .unwrap();

    let client_id: Option<String> = sqlx::query_scalar("SELECT client_id FROM projects WHERE id = 'p1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(client_id.is_none());
}

#[tokio::test]
async fn test_invalid_project_status_rejected() {
    let pool = init_memory_database().await.unwrap();

    sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, password_salt) VALUES ('u1', 'a@b.ru', 'A', 'h', 's')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = sqlx::query("INSERT INTO projects (id, owner_id, name, status) VALUES ('p1', 'u1', 'X', 'bogus')")
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
