//! Actor directory stored as a JSON object.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use parkhub_core::error::AppError;
use parkhub_core::result::AppResult;
use parkhub_core::traits::directory::{ActorNames, DirectoryStore};

use crate::file::{read_json, write_json};

/// Actor directory persisted as `{"<actor id>": "<display name>", ...}`
/// with keys sorted.
#[derive(Debug, Clone)]
pub struct JsonDirectoryStore {
    path: PathBuf,
}

impl JsonDirectoryStore {
    /// Create a store for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl DirectoryStore for JsonDirectoryStore {
    /// A missing file is a configuration error: the directory must exist,
    /// even if it is just `{}`.
    async fn load(&self) -> AppResult<ActorNames> {
        let names: ActorNames = read_json(&self.path).await?.ok_or_else(|| {
            AppError::configuration(format!(
                "Actor directory file '{}' does not exist",
                self.path.display()
            ))
        })?;
        info!(path = %self.path.display(), actors = names.len(), "Actor directory loaded");
        Ok(names)
    }

    async fn save(&self, names: &ActorNames) -> AppResult<()> {
        write_json(&self.path, names).await
    }
}
