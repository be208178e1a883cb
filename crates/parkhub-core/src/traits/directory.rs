//! Actor directory persistence trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::ActorId;

/// Actor id to display name mapping, ordered by id.
pub type ActorNames = BTreeMap<ActorId, String>;

/// Durable storage for the directory of known actors.
#[async_trait]
pub trait DirectoryStore: Send + Sync + 'static {
    /// Load the full directory.
    async fn load(&self) -> AppResult<ActorNames>;

    /// Replace the stored directory with `names`.
    async fn save(&self, names: &ActorNames) -> AppResult<()>;
}
