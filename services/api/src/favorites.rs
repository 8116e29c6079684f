//! Favorites and profiles

use std::{collections::HashMap, sync::Arc};

use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        FriendProfileResponse, ProfileResponse,
        anime::Anime,
        friendship::FriendshipStatus,
        user::UserResponse,
    },
    repositories::{AnimeStore, FriendshipStore, UserStore},
    validation::{require_non_empty, validate_avatar_url},
};

/// Favorites manager
#[derive(Clone)]
pub struct FavoritesManager {
    users: Arc<dyn UserStore>,
    anime: Arc<dyn AnimeStore>,
    friendships: Arc<dyn FriendshipStore>,
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

impl FavoritesManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        anime: Arc<dyn AnimeStore>,
        friendships: Arc<dyn FriendshipStore>,
    ) -> Self {
        Self {
            users,
            anime,
            friendships,
        }
    }

    pub async fn add_favorite(&self, user_id: Uuid, external_id: &str) -> ApiResult<Vec<String>> {
        require_non_empty(external_id, "imdbID")?;
        self.users
            .add_favorite(user_id, external_id)
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn remove_favorite(
        &self,
        user_id: Uuid,
        external_id: &str,
    ) -> ApiResult<Vec<String>> {
        require_non_empty(external_id, "imdbID")?;
        self.users
            .remove_favorite(user_id, external_id)
            .await?
            .ok_or_else(user_not_found)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> ApiResult<ProfileResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(user_not_found)?;

        let favorites_data = self.resolve(&user.favorites).await?;
        Ok(ProfileResponse {
            user: UserResponse::from(&user),
            favorites_data,
        })
    }

    pub async fn update_avatar(&self, user_id: Uuid, avatar_url: &str) -> ApiResult<UserResponse> {
        validate_avatar_url(avatar_url)?;
        let user = self
            .users
            .update_avatar(user_id, avatar_url)
            .await?
            .ok_or_else(user_not_found)?;
        Ok(UserResponse::from(&user))
    }

    /// Profile of `username` as seen by `viewer_id`; only the user and
    /// accepted friends may look
    pub async fn view_profile(
        &self,
        viewer_id: Uuid,
        username: &str,
    ) -> ApiResult<FriendProfileResponse> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(user_not_found)?;

        if user.id != viewer_id {
            let friendship = self.friendships.find_between(viewer_id, user.id).await?;
            if !friendship.is_some_and(|f| f.status == FriendshipStatus::Accepted) {
                return Err(ApiError::Forbidden(
                    "You can only view profiles of your friends".to_string(),
                ));
            }
        }

        let favorites_data = self.resolve(&user.favorites).await?;
        Ok(FriendProfileResponse {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            role: user.role,
            favorites: user.favorites,
            favorites_data,
        })
    }

    /// Resolve favorites in favorites order, skipping ids with no catalog entry
    async fn resolve(&self, favorites: &[String]) -> ApiResult<Vec<Anime>> {
        let mut by_id: HashMap<String, Anime> = self
            .anime
            .find_by_external_ids(favorites)
            .await?
            .into_iter()
            .map(|anime| (anime.external_id.clone(), anime))
            .collect();

        Ok(favorites.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::user::Role,
        state::Stores,
        testutil::{make_anime, memory_stores, seed_user},
    };

    fn manager(stores: &Stores) -> FavoritesManager {
        FavoritesManager::new(
            stores.users.clone(),
            stores.anime.clone(),
            stores.friendships.clone(),
        )
    }

    async fn seed_anime(stores: &Stores, external_id: &str, title: &str) {
        stores
            .anime
            .insert(&make_anime(external_id, title, &["Action"]).into_anime(Uuid::new_v4()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_is_idempotent_and_remove_is_noop_when_absent() {
        let stores = memory_stores();
        let favorites = manager(&stores);
        let user = seed_user(&stores, "alice", Role::User).await;

        assert_eq!(favorites.add_favorite(user.id, "tt1").await.unwrap(), ["tt1"]);
        assert_eq!(favorites.add_favorite(user.id, "tt2").await.unwrap(), ["tt1", "tt2"]);
        assert_eq!(favorites.add_favorite(user.id, "tt1").await.unwrap(), ["tt1", "tt2"]);

        assert_eq!(favorites.remove_favorite(user.id, "tt1").await.unwrap(), ["tt2"]);
        assert_eq!(favorites.remove_favorite(user.id, "tt9").await.unwrap(), ["tt2"]);
    }

    #[tokio::test]
    async fn empty_id_and_unknown_user_are_rejected() {
        let stores = memory_stores();
        let favorites = manager(&stores);
        let user = seed_user(&stores, "alice", Role::User).await;

        assert!(matches!(
            favorites.add_favorite(user.id, "").await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            favorites.add_favorite(Uuid::new_v4(), "tt1").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            favorites.get_profile(Uuid::new_v4()).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn profile_resolves_in_favorites_order_and_skips_orphans() {
        let stores = memory_stores();
        let favorites = manager(&stores);
        let user = seed_user(&stores, "alice", Role::User).await;
        seed_anime(&stores, "tt1", "Naruto").await;
        seed_anime(&stores, "tt2", "Bleach").await;

        for id in ["tt2", "tt-gone", "tt1"] {
            favorites.add_favorite(user.id, id).await.unwrap();
        }

        let profile = favorites.get_profile(user.id).await.unwrap();
        assert_eq!(profile.user.favorites, ["tt2", "tt-gone", "tt1"]);
        let resolved: Vec<&str> = profile
            .favorites_data
            .iter()
            .map(|a| a.external_id.as_str())
            .collect();
        assert_eq!(resolved, ["tt2", "tt1"]);

        stores.anime.delete("tt2").await.unwrap();
        let profile = favorites.get_profile(user.id).await.unwrap();
        assert_eq!(profile.favorites_data.len(), 1);
    }

    #[tokio::test]
    async fn avatar_must_be_http_url() {
        let stores = memory_stores();
        let favorites = manager(&stores);
        let user = seed_user(&stores, "alice", Role::User).await;

        assert!(matches!(
            favorites.update_avatar(user.id, "ftp://x/y.png").await,
            Err(ApiError::InvalidInput(_))
        ));

        let updated = favorites
            .update_avatar(user.id, "https://cdn.example.com/me.png")
            .await
            .unwrap();
        assert_eq!(updated.avatar, "https://cdn.example.com/me.png");
    }

    #[tokio::test]
    async fn profile_view_requires_accepted_friendship() {
        let stores = memory_stores();
        let favorites = manager(&stores);
        let alice = seed_user(&stores, "alice", Role::User).await;
        let bob = seed_user(&stores, "bob", Role::User).await;

        assert!(favorites.view_profile(alice.id, "alice").await.is_ok());
        assert!(matches!(
            favorites.view_profile(alice.id, "bob").await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            favorites.view_profile(alice.id, "nobody").await,
            Err(ApiError::NotFound(_))
        ));

        let request = stores.friendships.create(alice.id, bob.id).await.unwrap();
        assert!(matches!(
            favorites.view_profile(alice.id, "bob").await,
            Err(ApiError::Forbidden(_))
        ));

        stores.friendships.accept(request.id, bob.id).await.unwrap();
        let profile = favorites.view_profile(alice.id, "bob").await.unwrap();
        assert_eq!(profile.username, "bob");
    }
}
