//! Watch status repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{WatchStatusStore, decode_text};
use crate::models::watch_status::{WatchEntry, WatchState};

#[derive(Clone)]
pub struct WatchStatusRepository {
    pool: PgPool,
}

impl WatchStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatchStatusStore for WatchStatusRepository {
    async fn upsert(
        &self,
        user_id: Uuid,
        external_id: &str,
        status: WatchState,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO watch_status (user_id, external_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, external_id)
            DO UPDATE SET status = EXCLUDED.status, updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(external_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn list(&self, user_id: Uuid) -> DatabaseResult<Vec<WatchEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT external_id, status
            FROM watch_status
            WHERE user_id = $1
            ORDER BY updated_at, external_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(|row| {
                Ok(WatchEntry {
                    external_id: row.try_get("external_id")?,
                    status: decode_text(row, "status")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(DatabaseError::from_query)
    }
}
