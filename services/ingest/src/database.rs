use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AnimeRecord;

/// Destination for imported catalog rows
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    async fn upsert(&self, record: &AnimeRecord) -> DatabaseResult<()>;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogWriter for Database {
    /// Insert or refresh by external id
    ///
    /// Curated fields (localized title, overview, tags, backdrop, episodes)
    /// are left alone on existing rows; an empty overview is filled in.
    async fn upsert(&self, record: &AnimeRecord) -> DatabaseResult<()> {
        sqlx::query(
            "INSERT INTO anime (id, external_id, title, title_localized, poster, year, released, rating, genre, overview_localized)
             VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (external_id) DO UPDATE SET
             title = EXCLUDED.title,
             poster = EXCLUDED.poster,
             year = EXCLUDED.year,
             released = EXCLUDED.released,
             rating = EXCLUDED.rating,
             genre = EXCLUDED.genre,
             overview_localized = CASE
                 WHEN anime.overview_localized = '' THEN EXCLUDED.overview_localized
                 ELSE anime.overview_localized
             END,
             updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(&record.external_id)
        .bind(&record.title)
        .bind(&record.poster)
        .bind(&record.year)
        .bind(&record.released)
        .bind(&record.rating)
        .bind(&record.genre)
        .bind(&record.overview)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }
}
