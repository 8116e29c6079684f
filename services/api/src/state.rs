//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::CredentialManager,
    catalog::CatalogManager,
    config::Settings,
    favorites::FavoritesManager,
    friendship::FriendshipManager,
    jwt::JwtService,
    metadata_proxy::MetadataProxy,
    password::PasswordService,
    repositories::{
        AnimeStore, FriendshipStore, UserStore, WatchStatusStore, anime::AnimeRepository,
        friendship::FriendshipRepository, user::UserRepository,
        watch_status::WatchStatusRepository,
    },
    watch_status::WatchStatusManager,
};

/// The persistence backends the managers are built on
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub anime: Arc<dyn AnimeStore>,
    pub friendships: Arc<dyn FriendshipStore>,
    pub watch_status: Arc<dyn WatchStatusStore>,
}

impl Stores {
    /// Postgres-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            anime: Arc::new(AnimeRepository::new(pool.clone())),
            friendships: Arc::new(FriendshipRepository::new(pool.clone())),
            watch_status: Arc::new(WatchStatusRepository::new(pool)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtService,
    pub credentials: CredentialManager,
    pub favorites: FavoritesManager,
    pub catalog: CatalogManager,
    pub friendships: FriendshipManager,
    pub watch_status: WatchStatusManager,
    pub metadata: MetadataProxy,
}

impl AppState {
    /// Wire every manager to its stores
    pub fn new(
        stores: Stores,
        jwt: JwtService,
        passwords: PasswordService,
        settings: &Settings,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            credentials: CredentialManager::new(
                stores.users.clone(),
                passwords,
                jwt.clone(),
                settings.default_avatar_url.clone(),
                settings.allow_admin_registration,
            ),
            favorites: FavoritesManager::new(
                stores.users.clone(),
                stores.anime.clone(),
                stores.friendships.clone(),
            ),
            catalog: CatalogManager::new(stores.anime.clone()),
            friendships: FriendshipManager::new(stores.users, stores.friendships),
            watch_status: WatchStatusManager::new(stores.watch_status),
            metadata: MetadataProxy::new(settings.metadata_upstream_url.clone())?,
            jwt,
        })
    }
}
