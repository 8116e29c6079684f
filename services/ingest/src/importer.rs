//! One-shot catalog import: id list -> OMDb -> catalog rows

use std::{path::Path, time::Duration};

use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    database::CatalogWriter,
    models::{AnimeRecord, TitleId},
    omdb::OmdbClient,
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid id list in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read `[{"ttid": ...}, ...]` from a JSON file
pub fn load_ttids(path: &Path) -> Result<Vec<String>, IngestError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: display.clone(),
        source,
    })?;
    let ids: Vec<TitleId> = serde_json::from_str(&raw).map_err(|source| IngestError::Parse {
        path: display,
        source,
    })?;
    Ok(ids.into_iter().map(|id| id.ttid).collect())
}

/// Outcome counters of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub fetched: usize,
    pub skipped: usize,
    pub stored: usize,
}

pub struct Importer<W> {
    omdb: OmdbClient,
    writer: W,
    delay: Duration,
}

impl<W: CatalogWriter> Importer<W> {
    pub fn new(omdb: OmdbClient, writer: W, delay: Duration) -> Self {
        Self {
            omdb,
            writer,
            delay,
        }
    }

    /// Fetch and store every id; failures are logged and skipped
    pub async fn run(&self, ttids: &[String]) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for (index, ttid) in ttids.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                sleep(self.delay).await;
            }

            let title = match self.omdb.fetch(ttid).await {
                Ok(Some(title)) => title,
                Ok(None) => {
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Request for {} failed: {}", ttid, e);
                    summary.skipped += 1;
                    continue;
                }
            };
            summary.fetched += 1;

            let Some(record) = AnimeRecord::from_omdb(ttid, title) else {
                warn!("OMDb returned no title for {}", ttid);
                summary.skipped += 1;
                continue;
            };

            match self.writer.upsert(&record).await {
                Ok(()) => summary.stored += 1,
                Err(e) => error!("Failed to store {}: {}", record.external_id, e),
            }

            if (index + 1) % 100 == 0 {
                info!("Processed {} of {} ids", index + 1, ttids.len());
            }
        }

        summary
    }
}
