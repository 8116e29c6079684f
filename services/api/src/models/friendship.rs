//! Friendship model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::user::PublicUser;

/// Friendship state; the only transition is pending -> accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
        }
    }
}

impl FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            other => Err(format!("unknown friendship status: {}", other)),
        }
    }
}

/// Friendship entity: a directed request from `requester_id` to `target_id`
#[derive(Debug, Clone, PartialEq)]
pub struct Friendship {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// The user on the other side of this record from `user_id`
    pub fn other_party(&self, user_id: Uuid) -> Uuid {
        if self.requester_id == user_id {
            self.target_id
        } else {
            self.requester_id
        }
    }
}

/// Friend request payload; the target is given by id or by username
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestPayload {
    pub friend_id: Option<Uuid>,
    pub friend_username: Option<String>,
}

/// Who a friend request is addressed to
#[derive(Debug, Clone, PartialEq)]
pub enum FriendTarget {
    Id(Uuid),
    Username(String),
}

impl FriendRequestPayload {
    pub fn target(self) -> Option<FriendTarget> {
        match (self.friend_id, self.friend_username) {
            (Some(id), _) => Some(FriendTarget::Id(id)),
            (None, Some(username)) if !username.is_empty() => Some(FriendTarget::Username(username)),
            _ => None,
        }
    }
}

/// Incoming pending request as shown to its target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub friendship_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub requester: PublicUser,
}

/// Friends and incoming pending requests of a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendsOverview {
    pub friends: Vec<PublicUser>,
    pub pending_requests: Vec<PendingRequest>,
}

/// Response for a created friend request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestCreated {
    pub message: String,
    pub friendship_id: Uuid,
}
