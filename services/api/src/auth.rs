//! Registration and login

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::JwtService,
    models::{
        AuthResponse, LoginRequest, RegisterRequest,
        user::{NewUser, Role, User},
    },
    password::PasswordService,
    repositories::UserStore,
    validation::{require_non_empty, validate_email, validate_username},
};

/// Credential manager
#[derive(Clone)]
pub struct CredentialManager {
    users: Arc<dyn UserStore>,
    passwords: PasswordService,
    jwt: JwtService,
    default_avatar: String,
    allow_admin_registration: bool,
}

impl CredentialManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        passwords: PasswordService,
        jwt: JwtService,
        default_avatar: String,
        allow_admin_registration: bool,
    ) -> Self {
        Self {
            users,
            passwords,
            jwt,
            default_avatar,
            allow_admin_registration,
        }
    }

    /// Create an account and log it in
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<AuthResponse> {
        validate_username(&req.login)?;
        require_non_empty(&req.email, "Email")?;
        require_non_empty(&req.password, "Password")?;
        require_non_empty(&req.turnstile_token, "Captcha token")?;
        validate_email(&req.email)?;

        let role = self.resolve_role(req.role.as_deref())?;
        let password_hash = self.passwords.hash(&req.password)?;

        let new_user = NewUser {
            username: req.login,
            email: req.email,
            password_hash,
            role,
            avatar: self.default_avatar.clone(),
        };

        let user = match self.users.create(&new_user).await {
            Ok(user) => user,
            Err(e) if e.is_conflict() => {
                return Err(ApiError::Conflict(
                    "Username or email already exists".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        info!("Registered user {} with role {}", user.username, user.role);
        self.session_for(&user)
    }

    /// Log in by username or email
    pub async fn login(&self, req: LoginRequest) -> ApiResult<AuthResponse> {
        require_non_empty(&req.login, "Login")?;
        require_non_empty(&req.password, "Password")?;

        let user = self
            .users
            .find_by_login(&req.login)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        if !self.passwords.verify(&req.password, &user.password_hash)? {
            warn!("Failed login attempt for {}", user.username);
            return Err(ApiError::Unauthorized("Invalid password".to_string()));
        }

        self.session_for(&user)
    }

    fn resolve_role(&self, requested: Option<&str>) -> ApiResult<Role> {
        match requested {
            Some("admin") if self.allow_admin_registration => Ok(Role::Admin),
            Some("admin") => Err(ApiError::Forbidden(
                "Admin registration is disabled".to_string(),
            )),
            _ => Ok(Role::User),
        }
    }

    fn session_for(&self, user: &User) -> ApiResult<AuthResponse> {
        let token = self
            .jwt
            .issue(user.id, &user.username, user.role)
            .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}
