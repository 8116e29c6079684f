//! Watch status models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a user is with a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    PlanToWatch,
    Watching,
    Completed,
    Dropped,
}

impl WatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchState::PlanToWatch => "plan_to_watch",
            WatchState::Watching => "watching",
            WatchState::Completed => "completed",
            WatchState::Dropped => "dropped",
        }
    }
}

impl FromStr for WatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan_to_watch" => Ok(WatchState::PlanToWatch),
            "watching" => Ok(WatchState::Watching),
            "completed" => Ok(WatchState::Completed),
            "dropped" => Ok(WatchState::Dropped),
            other => Err(format!("unknown watch status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchEntry {
    #[serde(rename = "imdbID")]
    pub external_id: String,
    pub status: WatchState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchStatusRequest {
    #[serde(rename = "imdbID")]
    pub external_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStatusResponse {
    pub success: bool,
    pub watch_status: Vec<WatchEntry>,
}

/// Per-status counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchStats {
    pub plan_to_watch: u32,
    pub watching: u32,
    pub completed: u32,
    pub dropped: u32,
}

impl WatchStats {
    pub fn from_entries(entries: &[WatchEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, entry| {
            match entry.status {
                WatchState::PlanToWatch => stats.plan_to_watch += 1,
                WatchState::Watching => stats.watching += 1,
                WatchState::Completed => stats.completed += 1,
                WatchState::Dropped => stats.dropped += 1,
            }
            stats
        })
    }
}
