//! Friendship repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{FriendshipStore, decode_text};
use crate::models::friendship::{Friendship, FriendshipStatus};

/// Friendship repository
#[derive(Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    /// Create a new friendship repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn friendship_from_row(row: &PgRow) -> Result<Friendship, sqlx::Error> {
    Ok(Friendship {
        id: row.try_get("id")?,
        requester_id: row.try_get("requester_id")?,
        target_id: row.try_get("target_id")?,
        status: decode_text(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn optional_friendship(row: Option<PgRow>) -> DatabaseResult<Option<Friendship>> {
    row.as_ref()
        .map(friendship_from_row)
        .transpose()
        .map_err(DatabaseError::from_query)
}

#[async_trait]
impl FriendshipStore for FriendshipRepository {
    async fn create(&self, requester_id: Uuid, target_id: Uuid) -> DatabaseResult<Friendship> {
        info!("Creating friend request {} -> {}", requester_id, target_id);

        // friendships_pair_key rejects a second record for the pair
        let row = sqlx::query(
            r#"
            INSERT INTO friendships (id, requester_id, target_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, requester_id, target_id, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(requester_id)
        .bind(target_id)
        .bind(FriendshipStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        friendship_from_row(&row).map_err(DatabaseError::from_query)
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> DatabaseResult<Option<Friendship>> {
        let row = sqlx::query(
            r#"
            SELECT id, requester_id, target_id, status, created_at
            FROM friendships
            WHERE (requester_id = $1 AND target_id = $2)
               OR (requester_id = $2 AND target_id = $1)
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_friendship(row)
    }

    async fn find_for_target(
        &self,
        id: Uuid,
        target_id: Uuid,
    ) -> DatabaseResult<Option<Friendship>> {
        let row = sqlx::query(
            r#"
            SELECT id, requester_id, target_id, status, created_at
            FROM friendships
            WHERE id = $1 AND target_id = $2
            "#,
        )
        .bind(id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_friendship(row)
    }

    async fn accept(&self, id: Uuid, target_id: Uuid) -> DatabaseResult<Option<Friendship>> {
        info!("Accepting friend request {} by {}", id, target_id);

        let row = sqlx::query(
            r#"
            UPDATE friendships
            SET status = 'accepted', updated_at = NOW()
            WHERE id = $1 AND target_id = $2 AND status = 'pending'
            RETURNING id, requester_id, target_id, status, created_at
            "#,
        )
        .bind(id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        optional_friendship(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Friendship>> {
        let rows = sqlx::query(
            r#"
            SELECT id, requester_id, target_id, status, created_at
            FROM friendships
            WHERE requester_id = $1 OR target_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        rows.iter()
            .map(friendship_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::from_query)
    }
}
