//! Statistics checkpoint persistence trait.

use async_trait::async_trait;

use parkhub_core::result::AppResult;

use crate::export::StatsExport;

/// Durable storage for statistics checkpoints.
#[async_trait]
pub trait StatsStore: Send + Sync + 'static {
    /// Load the last checkpoint, if one was ever written.
    async fn load(&self) -> AppResult<Option<StatsExport>>;

    /// Overwrite the checkpoint.
    async fn save(&self, export: &StatsExport) -> AppResult<()>;
}
