//! Service settings loaded from `APP_*` environment variables

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Service settings
///
/// # Environment Variables
/// - `APP_BIND_ADDRESS`: listen address (default: `0.0.0.0:3000`)
/// - `APP_ALLOW_ADMIN_REGISTRATION`: let `/register` grant the admin role (default: `false`)
/// - `APP_DEFAULT_AVATAR_URL`: avatar assigned to new users
/// - `APP_METADATA_UPSTREAM_URL`: GraphQL endpoint behind `/metadata-proxy`
/// - `APP_CORS_ORIGINS`: comma separated list of allowed origins
/// - `APP_ARGON2_MEMORY_KIB`, `APP_ARGON2_ITERATIONS`, `APP_ARGON2_PARALLELISM`: password hashing cost
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default)]
    pub allow_admin_registration: bool,
    #[serde(default = "default_avatar_url")]
    pub default_avatar_url: String,
    #[serde(default = "default_metadata_upstream_url")]
    pub metadata_upstream_url: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_avatar_url() -> String {
    "https://i.ibb.co.com/Zyn02g6/avatar-default.webp".to_string()
}

fn default_metadata_upstream_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "https://animeinc.vercel.app".to_string(),
    ]
}

// Argon2id defaults recommended by OWASP (19 MiB, 2 passes, 1 lane)
fn default_argon2_memory_kib() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

impl Settings {
    /// Build settings from the process environment
    pub fn from_env() -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                Environment::with_prefix("APP")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allow_admin_registration: false,
            default_avatar_url: default_avatar_url(),
            metadata_upstream_url: default_metadata_upstream_url(),
            cors_origins: default_cors_origins(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}
