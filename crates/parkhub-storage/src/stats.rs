//! Statistics checkpoint stored as a JSON file.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use parkhub_core::result::AppResult;
use parkhub_stats::{StatsExport, StatsStore};

use crate::file::{read_json, write_json};

/// Statistics checkpoint persisted as a [`StatsExport`] JSON document.
#[derive(Debug, Clone)]
pub struct JsonStatsStore {
    path: PathBuf,
}

impl JsonStatsStore {
    /// Create a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StatsStore for JsonStatsStore {
    async fn load(&self) -> AppResult<Option<StatsExport>> {
        let export: Option<StatsExport> = read_json(&self.path).await?;
        match &export {
            Some(_) => info!(path = %self.path.display(), "Statistics checkpoint loaded"),
            None => info!(path = %self.path.display(), "No statistics checkpoint yet"),
        }
        Ok(export)
    }

    async fn save(&self, export: &StatsExport) -> AppResult<()> {
        write_json(&self.path, export).await?;
        debug!(path = %self.path.display(), "Statistics checkpoint saved");
        Ok(())
    }
}
