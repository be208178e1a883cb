//! Directory of known actors and their display names.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use parkhub_core::result::AppResult;
use parkhub_core::traits::directory::{ActorNames, DirectoryStore};
use parkhub_core::types::id::ActorId;

use crate::context::ActorContext;

/// In-memory actor directory written through to a [`DirectoryStore`] on
/// every change.
pub struct ActorDirectory {
    names: RwLock<ActorNames>,
    store: Arc<dyn DirectoryStore>,
}

impl std::fmt::Debug for ActorDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorDirectory").finish_non_exhaustive()
    }
}

impl ActorDirectory {
    /// Wrap already loaded names.
    pub fn new(names: ActorNames, store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            names: RwLock::new(names),
            store,
        }
    }

    /// Load the directory from `store`.
    pub async fn load(store: Arc<dyn DirectoryStore>) -> AppResult<Self> {
        let names = store.load().await?;
        Ok(Self::new(names, store))
    }

    /// Whether the actor is known.
    pub async fn contains(&self, actor: &ActorId) -> bool {
        self.names.read().await.contains_key(actor)
    }

    /// Display name of the actor, if known.
    pub async fn name(&self, actor: &ActorId) -> Option<String> {
        self.names.read().await.get(actor).cloned()
    }

    /// Copy of all names.
    pub async fn snapshot(&self) -> ActorNames {
        self.names.read().await.clone()
    }

    /// Record the actor's current display name.
    ///
    /// Returns the updated directory when something changed (new actor or
    /// renamed actor), after it was saved; `None` otherwise. If the save
    /// fails the in-memory directory is left unchanged.
    pub async fn observe(&self, ctx: &ActorContext) -> AppResult<Option<ActorNames>> {
        let name = ctx.display_name();
        let mut names = self.names.write().await;
        if names.get(&ctx.actor_id) == Some(&name) {
            return Ok(None);
        }

        let mut updated = names.clone();
        let previous = updated.insert(ctx.actor_id.clone(), name.clone());
        self.store.save(&updated).await?;
        *names = updated.clone();

        match previous {
            Some(old) => info!(actor = %ctx.actor_id, old = %old, new = %name, "Actor renamed"),
            None => info!(actor = %ctx.actor_id, name = %name, "Actor added"),
        }
        Ok(Some(updated))
    }

    /// Forget the actor. Returns whether it was known.
    ///
    /// The actor stays known if the save fails.
    pub async fn remove(&self, actor: &ActorId) -> AppResult<bool> {
        let mut names = self.names.write().await;
        if !names.contains_key(actor) {
            return Ok(false);
        }

        let mut updated = names.clone();
        updated.remove(actor);
        self.store.save(&updated).await?;
        *names = updated;
        info!(actor = %actor, "Actor removed");
        Ok(true)
    }
}
