//! JWT service for token generation and validation
//!
//! Tokens are HS256-signed with a single process-wide secret and carry the
//! subject id, username and role. There is no refresh mechanism: once a token
//! expires the user logs in again.

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::user::Role;

/// Upper bound on token lifetime (one year)
const MAX_TOKEN_EXPIRY: u64 = 365 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in seconds (default: 1 hour)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: signing secret
    /// - `JWT_SECRET_FILE`: path to a file holding the secret, used when `JWT_SECRET` is unset
    /// - `JWT_EXPIRY_SECONDS`: token lifetime in seconds (default: 3600, at most one year)
    pub fn from_env() -> Result<Self> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                let path = std::env::var("JWT_SECRET_FILE").map_err(|_| {
                    anyhow::anyhow!("Neither JWT_SECRET nor JWT_SECRET_FILE is set")
                })?;
                std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to read secret file {}: {}", path, e))?
                    .trim()
                    .to_string()
            }
        };

        let token_expiry = match std::env::var("JWT_EXPIRY_SECONDS") {
            Ok(raw) => raw.parse().map_err(|_| {
                anyhow::anyhow!("JWT_EXPIRY_SECONDS must be a number of seconds, got {}", raw)
            })?,
            Err(_) => 3600,
        };

        let config = JwtConfig {
            secret,
            token_expiry,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            anyhow::bail!("JWT signing secret is empty");
        }

        if self.token_expiry == 0 || self.token_expiry > MAX_TOKEN_EXPIRY {
            anyhow::bail!(
                "JWT token expiry must be between 1 and {} seconds, got {}",
                MAX_TOKEN_EXPIRY,
                self.token_expiry
            );
        }

        Ok(())
    }
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Username at issue time
    pub username: String,
    /// User role
    pub role: Role,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Token verification failure
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed token or expired
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Issue a token for the given identity
    pub fn issue(&self, subject_id: Uuid, username: &str, role: Role) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject_id,
            username: username.to_string(),
            role,
            iat: now,
            // Bounded by MAX_TOKEN_EXPIRY, so the cast cannot wrap
            exp: now + self.config.token_expiry as i64,
        };

        self.sign(&claims)
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the token expiry time
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?;
        Ok(token)
    }
}
