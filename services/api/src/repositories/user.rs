//! User repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{UserStore, decode_text};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, favorites, avatar, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role: decode_text(row, "role")?,
        favorites: row.try_get("favorites")?,
        avatar: row.try_get("avatar")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn optional_user(row: Option<PgRow>) -> DatabaseResult<Option<User>> {
    row.as_ref()
        .map(user_from_row)
        .transpose()
        .map_err(DatabaseError::from_query)
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, avatar)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(&new_user.avatar)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        user_from_row(&row).map_err(DatabaseError::from_query)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }

    async fn find_by_login(&self, login: &str) -> DatabaseResult<Option<User>> {
        info!("Finding user by username or email: {}", login);

        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE username = $1 OR email = $1
            LIMIT 1
            "#
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }

    async fn find_many(&self, ids: &[Uuid]) -> DatabaseResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY username"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::from_query)
    }

    async fn add_favorite(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> DatabaseResult<Option<Vec<String>>> {
        info!("Adding favorite {} for user {}", external_id, id);

        // Single statement so concurrent adds cannot lose each other
        let row = sqlx::query(
            r#"
            UPDATE users
            SET favorites = CASE
                    WHEN $2 = ANY(favorites) THEN favorites
                    ELSE array_append(favorites, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING favorites
            "#,
        )
        .bind(id)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.map(|row| row.try_get("favorites"))
            .transpose()
            .map_err(DatabaseError::from_query)
    }

    async fn remove_favorite(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> DatabaseResult<Option<Vec<String>>> {
        info!("Removing favorite {} for user {}", external_id, id);

        let row = sqlx::query(
            r#"
            UPDATE users
            SET favorites = array_remove(favorites, $2),
                updated_at = NOW()
            WHERE id = $1
            RETURNING favorites
            "#,
        )
        .bind(id)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.map(|row| row.try_get("favorites"))
            .transpose()
            .map_err(DatabaseError::from_query)
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET avatar = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_user(row)
    }
}
