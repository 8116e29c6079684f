//! Friend requests and friend lists
//!
//! A friendship record starts pending and can only be accepted by its
//! target, once. The record is the single source of truth for both the
//! friend list and the incoming request list.

use std::{collections::HashMap, sync::Arc};

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        friendship::{
            FriendRequestCreated, FriendRequestPayload, FriendTarget, Friendship,
            FriendshipStatus, FriendsOverview, PendingRequest,
        },
        user::{PublicUser, User},
    },
    repositories::{FriendshipStore, UserStore},
};

/// Friendship manager
#[derive(Clone)]
pub struct FriendshipManager {
    users: Arc<dyn UserStore>,
    friendships: Arc<dyn FriendshipStore>,
}

fn already_exists() -> ApiError {
    ApiError::Conflict("Friend request already exists".to_string())
}

impl FriendshipManager {
    pub fn new(users: Arc<dyn UserStore>, friendships: Arc<dyn FriendshipStore>) -> Self {
        Self { users, friendships }
    }

    /// Send a pending request from `requester_id` to the payload's target
    pub async fn send_request(
        &self,
        requester_id: Uuid,
        payload: FriendRequestPayload,
    ) -> ApiResult<FriendRequestCreated> {
        let target = payload.target().ok_or_else(|| {
            ApiError::InvalidInput("friendId or friendUsername is required".to_string())
        })?;

        let target = match target {
            FriendTarget::Id(id) => self.users.find_by_id(id).await?,
            FriendTarget::Username(username) => self.users.find_by_username(&username).await?,
        }
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if target.id == requester_id {
            return Err(ApiError::InvalidInput(
                "You cannot send a friend request to yourself".to_string(),
            ));
        }

        if self
            .friendships
            .find_between(requester_id, target.id)
            .await?
            .is_some()
        {
            return Err(already_exists());
        }

        // The pair index still catches a concurrent duplicate
        let friendship = match self.friendships.create(requester_id, target.id).await {
            Ok(friendship) => friendship,
            Err(e) if e.is_conflict() => return Err(already_exists()),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Friend request {} sent from {} to {}",
            friendship.id, requester_id, target.id
        );
        Ok(FriendRequestCreated {
            message: "Friend request sent".to_string(),
            friendship_id: friendship.id,
        })
    }

    /// Accept a pending request addressed to `user_id`
    pub async fn accept_request(&self, friendship_id: Uuid, user_id: Uuid) -> ApiResult<Friendship> {
        if let Some(accepted) = self.friendships.accept(friendship_id, user_id).await? {
            info!("Friend request {} accepted", friendship_id);
            return Ok(accepted);
        }

        match self.friendships.find_for_target(friendship_id, user_id).await? {
            Some(_) => Err(ApiError::Conflict(
                "Friend request already accepted".to_string(),
            )),
            None => Err(ApiError::NotFound("Friend request not found".to_string())),
        }
    }

    /// Accepted friends plus incoming pending requests
    pub async fn list_friends_and_pending(&self, user_id: Uuid) -> ApiResult<FriendsOverview> {
        let records = self.friendships.list_for_user(user_id).await?;

        let ids: Vec<Uuid> = records.iter().map(|f| f.other_party(user_id)).collect();
        let profiles: HashMap<Uuid, User> = self
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let mut friends = Vec::new();
        let mut pending_requests = Vec::new();
        for record in &records {
            let Some(other) = profiles.get(&record.other_party(user_id)) else {
                continue;
            };
            match record.status {
                FriendshipStatus::Accepted => friends.push(PublicUser::from(other)),
                FriendshipStatus::Pending if record.target_id == user_id => {
                    pending_requests.push(PendingRequest {
                        friendship_id: record.id,
                        created_at: record.created_at,
                        requester: PublicUser::from(other),
                    })
                }
                FriendshipStatus::Pending => {}
            }
        }

        Ok(FriendsOverview {
            friends,
            pending_requests,
        })
    }

    /// Exact username lookup for adding a friend
    pub async fn search_user(
        &self,
        acting_user_id: Uuid,
        username: Option<&str>,
    ) -> ApiResult<PublicUser> {
        let username = username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::InvalidInput("username is required".to_string()))?;

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if user.id == acting_user_id {
            return Err(ApiError::InvalidInput(
                "You cannot add yourself as a friend".to_string(),
            ));
        }

        Ok(PublicUser::from(&user))
    }
}
