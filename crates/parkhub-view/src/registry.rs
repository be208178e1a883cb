//! View registry: one view per subscribed actor.
//!
//! Entries are independent: each view sits behind its own mutex inside a
//! `DashMap`, and the map shard lock is never held across a transport
//! call. A broadcast snapshots the entries first and then updates every
//! actor concurrently, so one slow or failing actor never holds up the
//! others.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use parkhub_core::error::AppError;
use parkhub_core::result::AppResult;
use parkhub_core::traits::surface::SurfaceFactory;
use parkhub_core::types::id::ActorId;

use crate::view::{View, ViewContent, ViewUpdate, is_desynchronized};

/// How a refresh reached the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The existing surfaces were edited in place.
    Updated,
    /// The surfaces were gone and have been recreated.
    Repaired,
    /// The view was removed while the update was pending; nothing was sent.
    Retired,
}

/// Per-actor results of a broadcast.
#[derive(Debug, Default)]
pub struct NotifyOutcome {
    /// Actors whose view was edited in place.
    pub updated: Vec<ActorId>,
    /// Actors whose view had to be recreated.
    pub repaired: Vec<ActorId>,
    /// Actors whose view was removed before the update reached it.
    pub retired: Vec<ActorId>,
    /// Actors that could not be reached, with the reason.
    pub failed: Vec<(ActorId, AppError)>,
}

impl NotifyOutcome {
    /// Number of actors that received the update.
    pub fn delivered(&self) -> usize {
        self.updated.len() + self.repaired.len()
    }
}

/// Registry mapping actor ids to their views.
pub struct ViewRegistry {
    views: DashMap<ActorId, Arc<Mutex<View>>>,
    factory: Arc<dyn SurfaceFactory>,
}

impl std::fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("views", &self.views.len())
            .finish()
    }
}

impl ViewRegistry {
    /// Create an empty registry creating surfaces through `factory`.
    pub fn new(factory: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            views: DashMap::new(),
            factory,
        }
    }

    /// Register `view` for `actor`.
    ///
    /// A view previously registered for the actor is replaced; its surfaces
    /// are deleted first, tolerating ones that are already gone.
    pub async fn create_view(&self, actor: &ActorId, view: View) {
        let previous = self
            .views
            .insert(actor.clone(), Arc::new(Mutex::new(view)));

        if let Some(previous) = previous {
            let mut previous = previous.lock().await;
            previous.retire();
            if let Err(e) = previous.delete().await {
                warn!(actor = %actor, error = %e, "Superseded view not fully deleted");
            }
            debug!(actor = %actor, "Superseded view replaced");
        }

        info!(actor = %actor, views = self.views.len(), "View registered");
    }

    /// Create fresh surfaces for `actor` showing `content` and register them.
    pub async fn open_view(&self, actor: &ActorId, content: ViewContent) -> AppResult<()> {
        let view = View::open(self.factory.as_ref(), actor, content).await?;
        self.create_view(actor, view).await;
        Ok(())
    }

    /// Edit the actor's surfaces in place.
    ///
    /// Fails with `NotFound` for unknown actors and `Desynchronized` when a
    /// surface has vanished; the latter is fixed by
    /// [`repair_view`](Self::repair_view).
    pub async fn update_view(&self, actor: &ActorId, update: &ViewUpdate) -> AppResult<()> {
        let entry = self.entry(actor)?;
        let mut view = entry.lock().await;
        Self::check_live(actor, &view)?;
        view.update(update).await
    }

    /// Recreate the actor's surfaces with the current content plus `update`.
    pub async fn repair_view(&self, actor: &ActorId, update: &ViewUpdate) -> AppResult<()> {
        let entry = self.entry(actor)?;
        let mut view = entry.lock().await;
        Self::check_live(actor, &view)?;
        self.repair_locked(actor, &mut view, update).await
    }

    /// Update the actor's view, recreating it when it went missing.
    pub async fn refresh_view(
        &self,
        actor: &ActorId,
        update: &ViewUpdate,
    ) -> AppResult<RefreshOutcome> {
        let entry = self.entry(actor)?;
        self.refresh_entry(actor, &entry, update).await
    }

    /// Remove the actor's view and delete its surfaces.
    ///
    /// The entry is removed even if deleting the surfaces fails. Returns
    /// whether the actor had a view.
    pub async fn delete_view(&self, actor: &ActorId) -> AppResult<bool> {
        let Some((_, entry)) = self.views.remove(actor) else {
            debug!(actor = %actor, "No view to delete");
            return Ok(false);
        };

        let mut view = entry.lock().await;
        view.retire();
        info!(actor = %actor, views = self.views.len(), "View removed");
        view.delete().await?;
        Ok(true)
    }

    /// Apply a per-actor update to every registered view.
    ///
    /// Views that went missing are repaired; failures are collected per
    /// actor and never stop delivery to the rest.
    pub async fn notify_all<F>(&self, render: F) -> NotifyOutcome
    where
        F: Fn(&ActorId) -> ViewUpdate + Send + Sync,
    {
        let entries: Vec<(ActorId, Arc<Mutex<View>>)> = self
            .views
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();

        let deliveries = entries.into_iter().map(|(actor, entry)| {
            let update = render(&actor);
            async move {
                let result = self.refresh_entry(&actor, &entry, &update).await;
                (actor, result)
            }
        });

        let mut outcome = NotifyOutcome::default();
        for (actor, result) in join_all(deliveries).await {
            match result {
                Ok(RefreshOutcome::Updated) => outcome.updated.push(actor),
                Ok(RefreshOutcome::Repaired) => outcome.repaired.push(actor),
                Ok(RefreshOutcome::Retired) => outcome.retired.push(actor),
                Err(e) => {
                    warn!(actor = %actor, error = %e, "Failed to notify actor");
                    outcome.failed.push((actor, e));
                }
            }
        }

        info!(
            updated = outcome.updated.len(),
            repaired = outcome.repaired.len(),
            retired = outcome.retired.len(),
            failed = outcome.failed.len(),
            "Broadcast delivered"
        );
        outcome
    }

    /// Whether the actor has a view.
    pub fn contains(&self, actor: &ActorId) -> bool {
        self.views.contains_key(actor)
    }

    /// Number of registered views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no view is registered.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Content currently shown to the actor.
    pub async fn content(&self, actor: &ActorId) -> Option<ViewContent> {
        let entry = self.entry(actor).ok()?;
        let view = entry.lock().await;
        Some(view.content().clone())
    }

    fn entry(&self, actor: &ActorId) -> AppResult<Arc<Mutex<View>>> {
        self.views
            .get(actor)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| AppError::not_found(format!("No view for actor {actor}")))
    }

    fn check_live(actor: &ActorId, view: &View) -> AppResult<()> {
        if view.is_retired() {
            return Err(AppError::not_found(format!("No view for actor {actor}")));
        }
        Ok(())
    }

    async fn refresh_entry(
        &self,
        actor: &ActorId,
        entry: &Mutex<View>,
        update: &ViewUpdate,
    ) -> AppResult<RefreshOutcome> {
        let mut view = entry.lock().await;
        if view.is_retired() {
            debug!(actor = %actor, "View removed before the update, skipped");
            return Ok(RefreshOutcome::Retired);
        }
        match view.update(update).await {
            Ok(()) => Ok(RefreshOutcome::Updated),
            Err(e) if is_desynchronized(&e) => {
                debug!(actor = %actor, error = %e, "View desynchronized, repairing");
                self.repair_locked(actor, &mut view, update).await?;
                Ok(RefreshOutcome::Repaired)
            }
            Err(e) => Err(e),
        }
    }

    async fn repair_locked(
        &self,
        actor: &ActorId,
        view: &mut View,
        update: &ViewUpdate,
    ) -> AppResult<()> {
        let content = update.apply_to(view.content());

        // Whatever survived of the old pair would otherwise linger next to
        // the new one.
        if let Err(e) = view.delete().await {
            debug!(actor = %actor, error = %e, "Leftover surfaces not deleted");
        }

        let fresh = View::open(self.factory.as_ref(), actor, content).await?;
        view.replace(fresh);
        info!(actor = %actor, "View repaired");
        Ok(())
    }
}
