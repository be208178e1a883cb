//! Action dispatch.
//!
//! Every handler follows the same order: check access, record the actor,
//! run the lot transition, count statistics from the pre-transition
//! snapshots, then push the new lot state to the views. The lot is never
//! locked while a surface is being edited.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use parkhub_core::config::LoggingConfig;
use parkhub_core::error::{AppError, ErrorKind};
use parkhub_core::result::AppResult;
use parkhub_core::types::id::{ActorId, PlaceId};
use parkhub_lot::{Lot, PlaceSnapshot, PlaceState};
use parkhub_stats::{StatsEngine, StatsStore};
use parkhub_view::{ViewContent, ViewRegistry, ViewUpdate};

use crate::access::AccessPolicy;
use crate::action::Action;
use crate::context::ActorContext;
use crate::directory::ActorDirectory;
use crate::render;

/// Notice for a press on a stale keyboard.
pub const STALE_KEYBOARD: &str = "Use the keyboard from the latest message!";

/// Settings the service needs from the logging section.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Log file served by the `logs` command.
    pub log_file: Option<PathBuf>,
    /// Default number of lines for `logs`.
    pub log_length: usize,
}

impl ServiceSettings {
    /// Take the settings from the logging configuration.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            log_file: config.file.as_ref().map(PathBuf::from),
            log_length: config.log_length,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&LoggingConfig::default())
    }
}

/// Turns actor actions into lot transitions, statistics and view updates.
pub struct ParkingService {
    /// The managed places.
    pub(crate) lot: Arc<Lot>,
    /// Usage statistics.
    pub(crate) stats: Arc<StatsEngine>,
    /// Subscribed actors' views.
    pub(crate) views: Arc<ViewRegistry>,
    /// Known actors.
    pub(crate) directory: Arc<ActorDirectory>,
    /// Whitelist and owner checks.
    pub(crate) access: AccessPolicy,
    /// Logging settings for admin commands.
    pub(crate) settings: ServiceSettings,
    /// Statistics checkpoint, if persistence is enabled.
    pub(crate) stats_store: Option<Arc<dyn StatsStore>>,
    /// Held across export and save so checkpoints land in order.
    checkpoint_lock: Mutex<()>,
}

impl std::fmt::Debug for ParkingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingService")
            .field("places", &self.lot.len())
            .field("views", &self.views.len())
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

impl ParkingService {
    /// Create a service without a statistics checkpoint.
    pub fn new(
        lot: Arc<Lot>,
        stats: Arc<StatsEngine>,
        views: Arc<ViewRegistry>,
        directory: Arc<ActorDirectory>,
        access: AccessPolicy,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            lot,
            stats,
            views,
            directory,
            access,
            settings,
            stats_store: None,
            checkpoint_lock: Mutex::new(()),
        }
    }

    /// Checkpoint statistics to `store` after every change.
    pub fn with_stats_store(mut self, store: Arc<dyn StatsStore>) -> Self {
        self.stats_store = Some(store);
        self
    }

    /// The managed lot.
    pub fn lot(&self) -> &Arc<Lot> {
        &self.lot
    }

    /// The statistics engine.
    pub fn stats(&self) -> &Arc<StatsEngine> {
        &self.stats
    }

    /// The view registry.
    pub fn views(&self) -> &Arc<ViewRegistry> {
        &self.views
    }

    /// The actor directory.
    pub fn directory(&self) -> &Arc<ActorDirectory> {
        &self.directory
    }

    /// The access policy.
    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Subscribe the actor: record it and send it a fresh view.
    ///
    /// A view the actor already had is replaced.
    pub async fn start(&self, ctx: &ActorContext) -> AppResult<()> {
        self.admit(ctx).await?;
        self.open_start_view(&ctx.actor_id).await?;

        info!(actor = %ctx.actor_id, "Actor started");
        Ok(())
    }

    /// Send the welcome view with the current lot state.
    async fn open_start_view(&self, actor: &ActorId) -> AppResult<()> {
        let status = self.render_status(actor).await;
        let content = ViewContent {
            info: render::WELCOME.to_string(),
            status: status.status.unwrap_or_default(),
            keyboard: status.keyboard,
        };
        self.views.open_view(actor, content).await
    }

    /// Unsubscribe the actor and forget it. Returns the goodbye notice.
    pub async fn stop(&self, ctx: &ActorContext) -> AppResult<String> {
        let known = self.directory.contains(&ctx.actor_id).await;
        self.access.check(&ctx.actor_id, known)?;
        if !known {
            return Err(AppError::no_op(format!(
                "Actor {} is not subscribed",
                ctx.actor_id
            )));
        }

        if let Err(e) = self.views.delete_view(&ctx.actor_id).await {
            warn!(actor = %ctx.actor_id, error = %e, "View surfaces not deleted on stop");
        }
        self.directory.remove(&ctx.actor_id).await?;

        info!(actor = %ctx.actor_id, "Actor stopped");
        Ok(render::GOODBYE.to_string())
    }

    /// Dispatch a keyboard press. Returns the notice for the actor.
    pub async fn handle_callback(&self, ctx: &ActorContext, data: &str) -> AppResult<String> {
        self.admit(ctx).await?;

        match Action::parse(data) {
            Action::Place(id) => self.press_place(ctx, &id).await,
            Action::Cancel(id) => self.cancel_reservation(ctx, &id).await,
            Action::Clear => self.clear_lot(ctx).await,
            Action::Statistics => self.statistics(ctx).await,
        }
    }

    async fn press_place(&self, ctx: &ActorContext, id: &PlaceId) -> AppResult<String> {
        let place = self.lot.get(id.as_str())?;

        let transition = match place.toggle(&ctx.actor_id).await {
            Ok(transition) => transition,
            Err(e) if e.is(ErrorKind::Conflict) => {
                info!(actor = %ctx.actor_id, place = %id, "Pressed a place held by someone else");
                self.refresh_actor(&ctx.actor_id).await;
                return Ok(format!("Place {id} is not free!"));
            }
            Err(e) => return Err(e),
        };

        self.count(std::slice::from_ref(&transition.before)).await;

        let verb = match transition.after.state {
            PlaceState::Reserved => "reserved",
            PlaceState::Occupied => "occupied",
            PlaceState::Free => "freed",
        };
        let name = self.name_of(ctx).await;
        self.broadcast(render::action_line(&name, verb, Some(id.as_str())))
            .await;

        Ok(format!("You {verb} place {id}"))
    }

    async fn cancel_reservation(&self, ctx: &ActorContext, id: &PlaceId) -> AppResult<String> {
        let place = self.lot.get(id.as_str())?;

        match place.cancel_reservation(&ctx.actor_id).await {
            Ok(_) => {}
            Err(e) if e.is(ErrorKind::Conflict) => {
                info!(actor = %ctx.actor_id, place = %id, "Cancel from a stale keyboard");
                self.refresh_actor(&ctx.actor_id).await;
                return Ok(STALE_KEYBOARD.to_string());
            }
            Err(e) => return Err(e),
        }

        let name = self.name_of(ctx).await;
        self.broadcast(render::action_line(
            &name,
            "cancelled the reservation of",
            Some(id.as_str()),
        ))
        .await;

        Ok(format!("You cancelled the reservation of place {id}"))
    }

    async fn clear_lot(&self, ctx: &ActorContext) -> AppResult<String> {
        let cleared = match self.lot.clear().await {
            Ok(cleared) => cleared,
            Err(e) if e.is(ErrorKind::NoOp) => {
                info!(actor = %ctx.actor_id, "Clear from a stale keyboard");
                self.refresh_actor(&ctx.actor_id).await;
                return Ok(STALE_KEYBOARD.to_string());
            }
            Err(e) => return Err(e),
        };

        self.count(&cleared).await;

        let name = self.name_of(ctx).await;
        self.broadcast(render::action_line(&name, "cleared the parking", None))
            .await;

        Ok("You cleared the parking".to_string())
    }

    async fn statistics(&self, ctx: &ActorContext) -> AppResult<String> {
        let report = self.stats.ranked_report().await;
        let text = render::statistics_text(&report);

        // An actor without a view gets the regular start view first.
        if !self.views.contains(&ctx.actor_id) {
            self.open_start_view(&ctx.actor_id).await?;
        }
        self.views
            .refresh_view(&ctx.actor_id, &ViewUpdate::info(text))
            .await?;

        info!(actor = %ctx.actor_id, "Statistics requested");
        Ok("You requested statistics".to_string())
    }

    /// Access check, then record the actor's current name.
    async fn admit(&self, ctx: &ActorContext) -> AppResult<()> {
        let known = self.directory.contains(&ctx.actor_id).await;
        self.access.check(&ctx.actor_id, known)?;

        if let Some(names) = self.directory.observe(ctx).await? {
            self.stats.update_actor_directory(&names).await;
        }
        Ok(())
    }

    async fn name_of(&self, ctx: &ActorContext) -> String {
        self.directory
            .name(&ctx.actor_id)
            .await
            .unwrap_or_else(|| ctx.display_name())
    }

    /// Count pre-transition snapshots, then checkpoint if anything counted.
    async fn count(&self, before: &[PlaceSnapshot]) {
        let mut counted = false;
        for snapshot in before.iter().filter(|s| !s.is_free()) {
            self.stats.count(snapshot).await;
            counted = true;
        }
        if counted {
            self.checkpoint().await;
        }
    }

    /// Save statistics to the checkpoint store. Failures are logged only.
    pub(crate) async fn checkpoint(&self) {
        let Some(store) = &self.stats_store else {
            return;
        };
        let _guard = self.checkpoint_lock.lock().await;
        if let Err(e) = store.save(&self.stats.export().await).await {
            warn!(error = %e, "Statistics checkpoint failed");
        }
    }

    /// Status text and keyboard for `viewer`.
    async fn render_status(&self, viewer: &ActorId) -> ViewUpdate {
        let snapshot = self.lot.snapshot().await;
        let names = self.directory.snapshot().await;
        ViewUpdate {
            info: None,
            status: Some(render::status_text(&snapshot)),
            keyboard: Some(render::keyboard(&snapshot, viewer, &names)),
        }
    }

    /// Re-render only the actor's status, e.g. after a stale press.
    async fn refresh_actor(&self, actor: &ActorId) {
        if !self.views.contains(actor) {
            return;
        }
        let update = self.render_status(actor).await;
        if let Err(e) = self.views.refresh_view(actor, &update).await {
            warn!(actor = %actor, error = %e, "Failed to refresh actor view");
        }
    }

    /// Send `line` and the new lot state to every view.
    async fn broadcast(&self, line: String) {
        let snapshot = self.lot.snapshot().await;
        let names = self.directory.snapshot().await;
        let status = render::status_text(&snapshot);

        let outcome = self
            .views
            .notify_all(|actor| ViewUpdate {
                info: Some(line.clone()),
                status: Some(status.clone()),
                keyboard: Some(render::keyboard(&snapshot, actor, &names)),
            })
            .await;

        if !outcome.failed.is_empty() {
            warn!(
                failed = outcome.failed.len(),
                delivered = outcome.delivered(),
                "Broadcast partially failed"
            );
        }
    }
}
