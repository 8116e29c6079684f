//! Repositories for database operations
//!
//! Each store is a trait so the managers can be exercised against in-memory
//! implementations; the Postgres implementations live in the submodules.

use async_trait::async_trait;
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{
    anime::{Anime, AnimeDocument, AnimeFilter},
    friendship::Friendship,
    user::{NewUser, User},
    watch_status::{WatchEntry, WatchState},
};

pub mod anime;
pub mod friendship;
pub mod user;
pub mod watch_status;

/// Persistence of user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; a taken username or email is a conflict
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    /// Find a user whose username or email equals `login`
    async fn find_by_login(&self, login: &str) -> DatabaseResult<Option<User>>;

    async fn find_many(&self, ids: &[Uuid]) -> DatabaseResult<Vec<User>>;

    /// Add to the favorites set; `None` when the user does not exist
    async fn add_favorite(&self, id: Uuid, external_id: &str)
    -> DatabaseResult<Option<Vec<String>>>;

    /// Remove from the favorites set; `None` when the user does not exist
    async fn remove_favorite(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> DatabaseResult<Option<Vec<String>>>;

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> DatabaseResult<Option<User>>;
}

/// Persistence of catalog entries
#[async_trait]
pub trait AnimeStore: Send + Sync {
    /// Filtered listing ordered by title
    async fn list(&self, filter: &AnimeFilter) -> DatabaseResult<Vec<Anime>>;

    async fn find_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<Anime>>;

    /// Entries for the given external ids, in no particular order
    async fn find_by_external_ids(&self, external_ids: &[String]) -> DatabaseResult<Vec<Anime>>;

    async fn insert(&self, anime: &Anime) -> DatabaseResult<Anime>;

    /// Replace every field of the entry stored under `external_id`, keeping its id
    async fn replace(
        &self,
        external_id: &str,
        document: &AnimeDocument,
    ) -> DatabaseResult<Option<Anime>>;

    async fn delete(&self, external_id: &str) -> DatabaseResult<bool>;
}

/// Persistence of friendship records
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    /// Create a pending request; any existing record for the pair is a conflict
    async fn create(&self, requester_id: Uuid, target_id: Uuid) -> DatabaseResult<Friendship>;

    /// Record between two users regardless of direction
    async fn find_between(&self, a: Uuid, b: Uuid) -> DatabaseResult<Option<Friendship>>;

    async fn find_for_target(&self, id: Uuid, target_id: Uuid)
    -> DatabaseResult<Option<Friendship>>;

    /// Move a pending request addressed to `target_id` to accepted
    async fn accept(&self, id: Uuid, target_id: Uuid) -> DatabaseResult<Option<Friendship>>;

    /// Every record where the user is either side, oldest first
    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Friendship>>;
}

/// Persistence of per-user watch status
#[async_trait]
pub trait WatchStatusStore: Send + Sync {
    async fn upsert(&self, user_id: Uuid, external_id: &str, status: WatchState)
    -> DatabaseResult<()>;

    async fn list(&self, user_id: Uuid) -> DatabaseResult<Vec<WatchEntry>>;
}

/// Decode a TEXT column into an enum via `FromStr`
pub(crate) fn decode_text<T>(row: &sqlx::postgres::PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr<Err = String>,
{
    use sqlx::Row;

    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}
