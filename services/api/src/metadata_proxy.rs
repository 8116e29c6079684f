//! Relay for the third-party GraphQL metadata API

use axum::http::StatusCode;
use reqwest::{Client, header};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    models::MetadataProxyRequest,
    validation::require_non_empty,
};

/// Metadata proxy
#[derive(Clone)]
pub struct MetadataProxy {
    client: Client,
    upstream_url: String,
}

impl MetadataProxy {
    pub fn new(upstream_url: String) -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            upstream_url,
        })
    }

    /// Post the query upstream and hand back its status and JSON body as is
    pub async fn forward(&self, req: MetadataProxyRequest) -> ApiResult<(StatusCode, Value)> {
        require_non_empty(&req.query, "query")?;

        let body = json!({
            "query": req.query,
            "variables": req.variables.unwrap_or_else(|| json!({})),
        });

        info!("Forwarding metadata query to {}", self.upstream_url);
        let response = self
            .client
            .post(&self.upstream_url)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| ApiError::Internal(format!("Invalid upstream status: {}", e)))?;
        let payload = response.json::<Value>().await.map_err(|e| {
            error!("Upstream returned a non-JSON body: {}", e);
            ApiError::Internal("Metadata upstream returned an invalid response".to_string())
        })?;

        Ok((status, payload))
    }
}
