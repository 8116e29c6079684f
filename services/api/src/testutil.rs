//! Shared test helpers, available to all `#[cfg(test)]` modules in the crate.
//!
//! The in-memory stores mirror the Postgres repositories closely enough for
//! manager and router tests: same uniqueness conflicts, same ordering.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    database::{DatabaseConfig, init_pool, run_migrations},
    error::{DatabaseError, DatabaseResult},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::Settings,
    jwt::{JwtConfig, JwtService},
    models::{
        anime::{Anime, AnimeDocument, AnimeFilter},
        friendship::{Friendship, FriendshipStatus},
        user::{NewUser, Role, User},
        watch_status::{WatchEntry, WatchState},
    },
    password::PasswordService,
    repositories::{AnimeStore, FriendshipStore, UserStore, WatchStatusStore},
    state::{AppState, Stores},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::Conflict("users_username_key".into()));
        }
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict("users_email_key".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            favorites: Vec::new(),
            avatar: new_user.avatar.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_login(&self, login: &str) -> DatabaseResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == login || u.email == login)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> DatabaseResult<Vec<User>> {
        let mut found: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(found)
    }

    async fn add_favorite(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> DatabaseResult<Option<Vec<String>>> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            if !user.favorites.iter().any(|f| f == external_id) {
                user.favorites.push(external_id.to_string());
            }
            user.favorites.clone()
        }))
    }

    async fn remove_favorite(
        &self,
        id: Uuid,
        external_id: &str,
    ) -> DatabaseResult<Option<Vec<String>>> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.favorites.retain(|f| f != external_id);
            user.favorites.clone()
        }))
    }

    async fn update_avatar(&self, id: Uuid, avatar: &str) -> DatabaseResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            user.avatar = avatar.to_string();
            user.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryAnimeStore {
    anime: Mutex<Vec<Anime>>,
}

fn matches_filter(anime: &Anime, filter: &AnimeFilter) -> bool {
    let genre_ok =
        filter.genres.is_empty() || anime.genre.iter().any(|g| filter.genres.contains(g));
    let search_ok = filter.search.as_ref().is_none_or(|term| {
        let term = term.to_lowercase();
        anime.title.to_lowercase().contains(&term)
            || anime.title_localized.to_lowercase().contains(&term)
    });
    genre_ok && search_ok
}

#[async_trait]
impl AnimeStore for MemoryAnimeStore {
    async fn list(&self, filter: &AnimeFilter) -> DatabaseResult<Vec<Anime>> {
        let mut found: Vec<Anime> = self
            .anime
            .lock()
            .unwrap()
            .iter()
            .filter(|a| matches_filter(a, filter))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.title
                .cmp(&b.title)
                .then_with(|| a.external_id.cmp(&b.external_id))
        });
        if let Some(limit) = filter.limit {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn find_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<Anime>> {
        Ok(self
            .anime
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.external_id == external_id)
            .cloned())
    }

    async fn find_by_external_ids(&self, external_ids: &[String]) -> DatabaseResult<Vec<Anime>> {
        // Reverse storage order so callers cannot rely on it
        Ok(self
            .anime
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|a| external_ids.contains(&a.external_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, anime: &Anime) -> DatabaseResult<Anime> {
        let mut all = self.anime.lock().unwrap();
        if all.iter().any(|a| a.external_id == anime.external_id) {
            return Err(DatabaseError::Conflict("anime_external_id_key".into()));
        }
        all.push(anime.clone());
        Ok(anime.clone())
    }

    async fn replace(
        &self,
        external_id: &str,
        document: &AnimeDocument,
    ) -> DatabaseResult<Option<Anime>> {
        let mut all = self.anime.lock().unwrap();
        if document.external_id != external_id
            && all.iter().any(|a| a.external_id == document.external_id)
        {
            return Err(DatabaseError::Conflict("anime_external_id_key".into()));
        }
        Ok(all
            .iter_mut()
            .find(|a| a.external_id == external_id)
            .map(|existing| {
                *existing = document.clone().into_anime(existing.id);
                existing.clone()
            }))
    }

    async fn delete(&self, external_id: &str) -> DatabaseResult<bool> {
        let mut all = self.anime.lock().unwrap();
        let before = all.len();
        all.retain(|a| a.external_id != external_id);
        Ok(all.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryFriendshipStore {
    friendships: Mutex<Vec<Friendship>>,
}

fn same_pair(f: &Friendship, a: Uuid, b: Uuid) -> bool {
    (f.requester_id == a && f.target_id == b) || (f.requester_id == b && f.target_id == a)
}

#[async_trait]
impl FriendshipStore for MemoryFriendshipStore {
    async fn create(&self, requester_id: Uuid, target_id: Uuid) -> DatabaseResult<Friendship> {
        let mut all = self.friendships.lock().unwrap();
        if all.iter().any(|f| same_pair(f, requester_id, target_id)) {
            return Err(DatabaseError::Conflict("friendships_pair_key".into()));
        }

        let now = Utc::now();
        let friendship = Friendship {
            id: Uuid::new_v4(),
            requester_id,
            target_id,
            status: FriendshipStatus::Pending,
            created_at: now,
        };
        all.push(friendship.clone());
        Ok(friendship)
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> DatabaseResult<Option<Friendship>> {
        Ok(self
            .friendships
            .lock()
            .unwrap()
            .iter()
            .find(|f| same_pair(f, a, b))
            .cloned())
    }

    async fn find_for_target(
        &self,
        id: Uuid,
        target_id: Uuid,
    ) -> DatabaseResult<Option<Friendship>> {
        Ok(self
            .friendships
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id == id && f.target_id == target_id)
            .cloned())
    }

    async fn accept(&self, id: Uuid, target_id: Uuid) -> DatabaseResult<Option<Friendship>> {
        let mut all = self.friendships.lock().unwrap();
        Ok(all
            .iter_mut()
            .find(|f| {
                f.id == id && f.target_id == target_id && f.status == FriendshipStatus::Pending
            })
            .map(|f| {
                f.status = FriendshipStatus::Accepted;
                f.clone()
            }))
    }

    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<Friendship>> {
        Ok(self
            .friendships
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.requester_id == user_id || f.target_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryWatchStatusStore {
    entries: Mutex<Vec<(Uuid, WatchEntry)>>,
}

#[async_trait]
impl WatchStatusStore for MemoryWatchStatusStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        external_id: &str,
        status: WatchState,
    ) -> DatabaseResult<()> {
        let mut entries = self.entries.lock().unwrap();
        match entries
            .iter_mut()
            .find(|(owner, e)| *owner == user_id && e.external_id == external_id)
        {
            Some((_, entry)) => entry.status = status,
            None => entries.push((
                user_id,
                WatchEntry {
                    external_id: external_id.to_string(),
                    status,
                },
            )),
        }
        Ok(())
    }

    async fn list(&self, user_id: Uuid) -> DatabaseResult<Vec<WatchEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

/// Fresh, empty in-memory stores
pub fn memory_stores() -> Stores {
    Stores {
        users: Arc::new(MemoryUserStore::default()),
        anime: Arc::new(MemoryAnimeStore::default()),
        friendships: Arc::new(MemoryFriendshipStore::default()),
        watch_status: Arc::new(MemoryWatchStatusStore::default()),
    }
}

/// Cheapest argon2 parameters, so tests stay fast
pub fn fast_passwords() -> PasswordService {
    PasswordService::new(8, 1, 1).unwrap()
}

pub fn test_jwt() -> JwtService {
    JwtService::new(JwtConfig {
        secret: "test-secret".to_string(),
        token_expiry: 3600,
    })
    .unwrap()
}

/// Build a full `AppState` around the given stores.
pub fn test_state_with(stores: Stores, settings: &Settings) -> AppState {
    AppState::new(stores, test_jwt(), fast_passwords(), settings).unwrap()
}

/// Insert a user directly, bypassing registration
pub async fn seed_user(stores: &Stores, username: &str, role: Role) -> User {
    stores
        .users
        .create(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: fast_passwords().hash("password").unwrap(),
            role,
            avatar: "https://example.com/avatar.png".to_string(),
        })
        .await
        .unwrap()
}

/// Migrated pool for the database in `DATABASE_URL`
///
/// Only used by tests marked `#[ignore = "requires a running PostgreSQL instance"]`.
pub async fn pg_pool() -> PgPool {
    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    run_migrations(&pool, &crate::MIGRATOR).await.unwrap();
    pool
}

/// Short random suffix keeping rows from separate runs apart
pub fn unique_tag() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Catalog entry with the given external id and titles
pub fn make_anime(external_id: &str, title: &str, genre: &[&str]) -> AnimeDocument {
    AnimeDocument {
        external_id: external_id.to_string(),
        title: title.to_string(),
        title_localized: format!("{title} (localized)"),
        poster: format!("https://img.example.com/{external_id}.jpg"),
        year: "2002".to_string(),
        released: "03 Oct 2002".to_string(),
        genre: genre.iter().map(|g| g.to_string()).collect(),
        overview_localized: "overview".to_string(),
        ..Default::default()
    }
}
