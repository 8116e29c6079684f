//! Anime catalog repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::AnimeStore;
use crate::models::anime::{Anime, AnimeDocument, AnimeFilter};

const ANIME_COLUMNS: &str = "id, external_id, title, title_localized, poster, backdrop, year, \
     released, rating, episodes, genre, tags, overview_localized";

/// Anime repository
#[derive(Clone)]
pub struct AnimeRepository {
    pool: PgPool,
}

impl AnimeRepository {
    /// Create a new anime repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn anime_from_row(row: &PgRow) -> Result<Anime, sqlx::Error> {
    Ok(Anime {
        id: row.try_get("id")?,
        external_id: row.try_get("external_id")?,
        title: row.try_get("title")?,
        title_localized: row.try_get("title_localized")?,
        poster: row.try_get("poster")?,
        backdrop: row.try_get("backdrop")?,
        year: row.try_get("year")?,
        released: row.try_get("released")?,
        rating: row.try_get("rating")?,
        episodes: row.try_get("episodes")?,
        genre: row.try_get("genre")?,
        tags: row.try_get("tags")?,
        overview_localized: row.try_get("overview_localized")?,
    })
}

fn all_anime(rows: Vec<PgRow>) -> DatabaseResult<Vec<Anime>> {
    rows.iter()
        .map(anime_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from_query)
}

/// Build an `ILIKE` pattern matching `term` anywhere, with `%`, `_` and `\`
/// taken literally
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl AnimeStore for AnimeRepository {
    async fn list(&self, filter: &AnimeFilter) -> DatabaseResult<Vec<Anime>> {
        info!("Listing anime with filter: {:?}", filter);

        // LIMIT NULL means no limit
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ANIME_COLUMNS}
            FROM anime
            WHERE (cardinality($1::text[]) = 0 OR genre && $1::text[])
              AND ($2::text IS NULL
                   OR title ILIKE $2 ESCAPE '\'
                   OR title_localized ILIKE $2 ESCAPE '\')
            ORDER BY title, external_id
            LIMIT $3
            "#
        ))
        .bind(&filter.genres)
        .bind(filter.search.as_deref().map(like_pattern))
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        all_anime(rows)
    }

    async fn find_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<Anime>> {
        let row = sqlx::query(&format!(
            "SELECT {ANIME_COLUMNS} FROM anime WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(anime_from_row)
            .transpose()
            .map_err(DatabaseError::from_query)
    }

    async fn find_by_external_ids(&self, external_ids: &[String]) -> DatabaseResult<Vec<Anime>> {
        if external_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {ANIME_COLUMNS} FROM anime WHERE external_id = ANY($1)"
        ))
        .bind(external_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        all_anime(rows)
    }

    async fn insert(&self, anime: &Anime) -> DatabaseResult<Anime> {
        info!("Creating anime: {}", anime.external_id);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO anime (
                id, external_id, title, title_localized, poster, backdrop, year,
                released, rating, episodes, genre, tags, overview_localized
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ANIME_COLUMNS}
            "#
        ))
        .bind(anime.id)
        .bind(&anime.external_id)
        .bind(&anime.title)
        .bind(&anime.title_localized)
        .bind(&anime.poster)
        .bind(&anime.backdrop)
        .bind(&anime.year)
        .bind(&anime.released)
        .bind(&anime.rating)
        .bind(anime.episodes)
        .bind(&anime.genre)
        .bind(&anime.tags)
        .bind(&anime.overview_localized)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        anime_from_row(&row).map_err(DatabaseError::from_query)
    }

    async fn replace(
        &self,
        external_id: &str,
        document: &AnimeDocument,
    ) -> DatabaseResult<Option<Anime>> {
        info!("Replacing anime: {}", external_id);

        let row = sqlx::query(&format!(
            r#"
            UPDATE anime
            SET external_id = $2,
                title = $3,
                title_localized = $4,
                poster = $5,
                backdrop = $6,
                year = $7,
                released = $8,
                rating = $9,
                episodes = $10,
                genre = $11,
                tags = $12,
                overview_localized = $13,
                updated_at = NOW()
            WHERE external_id = $1
            RETURNING {ANIME_COLUMNS}
            "#
        ))
        .bind(external_id)
        .bind(&document.external_id)
        .bind(&document.title)
        .bind(&document.title_localized)
        .bind(&document.poster)
        .bind(&document.backdrop)
        .bind(&document.year)
        .bind(&document.released)
        .bind(&document.rating)
        .bind(document.episodes)
        .bind(&document.genre)
        .bind(&document.tags)
        .bind(&document.overview_localized)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(anime_from_row)
            .transpose()
            .map_err(DatabaseError::from_query)
    }

    async fn delete(&self, external_id: &str) -> DatabaseResult<bool> {
        info!("Deleting anime: {}", external_id);

        let result = sqlx::query("DELETE FROM anime WHERE external_id = $1")
            .bind(external_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}
