//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod anime;
pub mod friendship;
pub mod user;
pub mod watch_status;

use anime::Anime;
use user::{Role, SessionUser, UserResponse};

/// Request for user registration
///
/// Missing fields deserialize as empty strings so that they are reported as
/// invalid input instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default, alias = "username")]
    pub login: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub turnstile_token: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Request for user login; `login` is a username or an email
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

/// Token plus the user it was issued for
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRequest {
    #[serde(rename = "imdbID", default)]
    pub external_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FavoritesResponse {
    pub success: bool,
    pub favorites: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    #[serde(default)]
    pub avatar_url: String,
}

/// Own profile with resolved favorite anime
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub favorites_data: Vec<Anime>,
}

/// Another user's profile as seen by a friend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendProfileResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub avatar: String,
    pub role: Role,
    pub favorites: Vec<String>,
    pub favorites_data: Vec<Anime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub username: Option<String>,
}

/// GraphQL payload relayed to the metadata upstream
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataProxyRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_username_alias() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"alice","email":"a@b.c","password":"pw","turnstileToken":"t"}"#,
        )
        .unwrap();
        assert_eq!(req.login, "alice");
        assert_eq!(req.turnstile_token, "t");
        assert!(req.role.is_none());
    }

    #[test]
    fn register_missing_fields_are_empty() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.login.is_empty());
        assert!(req.password.is_empty());
    }
}
