//! OMDb title lookups

use std::env;

use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::models::OmdbTitle;

/// Ingestion settings
///
/// # Environment Variables
/// - `OMDB_API_KEY`: API key (required)
/// - `OMDB_BASE_URL`: lookup endpoint (default: `http://www.omdbapi.com/`)
/// - `INGEST_INPUT_FILE`: JSON list of `{"ttid": ...}` (default: `anime_ttid_list.json`)
/// - `INGEST_DELAY_MS`: pause between lookups (default: 1000)
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub api_key: String,
    pub base_url: String,
    pub input_file: String,
    pub delay_ms: u64,
}

impl IngestConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OMDB_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow::anyhow!("OMDB_API_KEY environment variable not set"))?;

        let base_url =
            env::var("OMDB_BASE_URL").unwrap_or_else(|_| "http://www.omdbapi.com/".to_string());
        let input_file =
            env::var("INGEST_INPUT_FILE").unwrap_or_else(|_| "anime_ttid_list.json".to_string());
        let delay_ms = env::var("INGEST_DELAY_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .unwrap_or(1000);

        Ok(Self {
            api_key,
            base_url,
            input_file,
            delay_ms,
        })
    }
}

/// OMDb client
#[derive(Clone)]
pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Look up one title; `None` when OMDb reports it unknown
    pub async fn fetch(&self, ttid: &str) -> Result<Option<OmdbTitle>, reqwest::Error> {
        let title: OmdbTitle = self
            .client
            .get(&self.base_url)
            .query(&[("i", ttid), ("apikey", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !title.is_success() {
            warn!(
                "OMDb lookup failed for {}: {}",
                ttid,
                title.error.as_deref().unwrap_or("unknown error")
            );
            return Ok(None);
        }

        info!("Fetched {} from OMDb", ttid);
        Ok(Some(title))
    }
}
