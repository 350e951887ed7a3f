//! Persistent store tests: schema idempotence, scoped connection release and
//! concurrent access through the pool.

use std::time::Duration;

use hedgefund_backend::db::{Database, StoreError, StoreResult};

async fn temp_db(dir: &tempfile::TempDir) -> Database {
    let url = format!("sqlite://{}", dir.path().join("store.db").display());
    Database::connect_url(&url).await.unwrap()
}

#[tokio::test]
async fn test_connect_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    assert!(!path.exists());

    let db = temp_db(&dir).await;
    db.ensure_schema().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_ensure_schema_is_idempotent_and_non_destructive() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir).await;

    db.ensure_schema().await.unwrap();
    db.ensure_schema().await.unwrap();

    sqlx::query("INSERT INTO hedge_fund_flows (name) VALUES (?1)")
        .bind("momentum")
        .execute(db.pool())
        .await
        .unwrap();

    // A third run must leave existing rows untouched.
    db.ensure_schema().await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hedge_fund_flows")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_health_check_on_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir).await;
    db.ensure_schema().await.unwrap();
    assert!(db.health_check().await.unwrap());
}

#[tokio::test]
async fn test_scoped_checkout_releases_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir).await;
    db.ensure_schema().await.unwrap();

    let width = db.pool_stats().max_size;

    // Every scoped operation fails; the connections must still come back.
    let mut handles = Vec::new();
    for _ in 0..width {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            let result: StoreResult<()> = db
                .with_connection(|mut conn| async move {
                    sqlx::query("SELECT 1")
                        .execute(&mut *conn)
                        .await
                        .map_err(StoreError::Query)?;
                    Err(StoreError::Query(sqlx::Error::RowNotFound))
                })
                .await;
            assert!(result.is_err());
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // The full pool width is acquirable again, so nothing leaked.
    let mut held = Vec::new();
    for _ in 0..width {
        let conn = tokio::time::timeout(Duration::from_secs(5), db.pool().acquire())
            .await
            .expect("pool exhausted: a connection was not released")
            .expect("acquire failed");
        held.push(conn);
    }
}

#[tokio::test]
async fn test_concurrent_writes_from_independent_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let db = temp_db(&dir).await;
    db.ensure_schema().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.with_connection(|mut conn| async move {
                sqlx::query("INSERT INTO hedge_fund_flows (name) VALUES (?1)")
                    .bind(format!("flow-{i}"))
                    .execute(&mut *conn)
                    .await
                    .map_err(StoreError::Query)?;
                Ok(())
            })
            .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hedge_fund_flow_runs")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM hedge_fund_flows")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 8);
}
