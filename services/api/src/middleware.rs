//! Authentication middleware for JWT token validation
//!
//! `auth_middleware` turns a bearer token into an [`AuthUser`] in the request
//! extensions; `require_admin` runs after it on admin routes.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{error::ApiError, models::user::Role, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

fn unauthenticated(msg: &str) -> ApiError {
    ApiError::Unauthenticated(msg.to_string())
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| unauthenticated("Missing authorization header"))?
        .to_str()
        .map_err(|_| unauthenticated("Invalid authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthenticated("Invalid authorization header"))?;

    let claims = state.jwt.verify(token).map_err(|e| {
        debug!("Rejected token: {}", e);
        unauthenticated("Invalid or expired token")
    })?;

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Admin gate, layered inside [`auth_middleware`]
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| unauthenticated("Authentication required"))?;

    if user.role != Role::Admin {
        warn!("User {} denied admin access", user.username);
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| unauthenticated("Authentication required"))
    }
}
