//! Per-user watch status

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::watch_status::{WatchEntry, WatchState, WatchStats, WatchStatusRequest},
    repositories::WatchStatusStore,
    validation::require_non_empty,
};

#[derive(Clone)]
pub struct WatchStatusManager {
    entries: Arc<dyn WatchStatusStore>,
}

impl WatchStatusManager {
    pub fn new(entries: Arc<dyn WatchStatusStore>) -> Self {
        Self { entries }
    }

    /// Set the status for one title and return the user's full list
    pub async fn set_status(
        &self,
        user_id: Uuid,
        req: WatchStatusRequest,
    ) -> ApiResult<Vec<WatchEntry>> {
        require_non_empty(&req.external_id, "imdbID")?;
        let status: WatchState = req.status.parse().map_err(|_| {
            ApiError::InvalidInput(
                "status must be one of plan_to_watch, watching, completed, dropped".to_string(),
            )
        })?;

        self.entries
            .upsert(user_id, &req.external_id, status)
            .await?;
        Ok(self.entries.list(user_id).await?)
    }

    pub async fn stats(&self, user_id: Uuid) -> ApiResult<WatchStats> {
        let entries = self.entries.list(user_id).await?;
        Ok(WatchStats::from_entries(&entries))
    }
}
