//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database is properly configured and
//! reachable from the application. They need a running database pointed to by
//! `DATABASE_URL` and are ignored by default.

use common::{
    database::{DatabaseConfig, health_check, init_pool},
    error::DatabaseError,
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_database_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_unique_violation_is_classified_as_conflict() -> Result<(), Box<dyn std::error::Error>>
{
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    let mut tx = pool.begin().await?;

    sqlx::query("CREATE TEMP TABLE conflict_probe (key TEXT PRIMARY KEY)")
        .execute(&mut *tx)
        .await?;
    sqlx::query("INSERT INTO conflict_probe (key) VALUES ('tt0001')")
        .execute(&mut *tx)
        .await?;

    let err = sqlx::query("INSERT INTO conflict_probe (key) VALUES ('tt0001')")
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_query)
        .expect_err("duplicate insert must fail");

    assert!(err.is_conflict(), "unexpected error: {err}");
    tx.rollback().await?;
    Ok(())
}
