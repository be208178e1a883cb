//! A single actor's view: an info surface and a status surface.

use tracing::{debug, warn};

use parkhub_core::error::{AppError, ErrorKind};
use parkhub_core::result::AppResult;
use parkhub_core::traits::surface::{Surface, SurfaceFactory};
use parkhub_core::types::id::ActorId;
use parkhub_core::types::keyboard::Keyboard;

/// Everything rendered into a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewContent {
    /// Text of the transient info surface.
    pub info: String,
    /// Text of the persistent status surface.
    pub status: String,
    /// Keyboard attached to the status surface.
    pub keyboard: Option<Keyboard>,
}

/// A partial change to a view. Unset parts keep their current content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    /// New info text.
    pub info: Option<String>,
    /// New status text.
    pub status: Option<String>,
    /// New keyboard for the status surface.
    pub keyboard: Option<Keyboard>,
}

impl ViewUpdate {
    /// Update replacing every part.
    pub fn full(content: ViewContent) -> Self {
        Self {
            info: Some(content.info),
            status: Some(content.status),
            keyboard: content.keyboard,
        }
    }

    /// Update touching only the info surface.
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            info: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.info.is_none() && self.status.is_none() && self.keyboard.is_none()
    }

    /// Content after applying this update on top of `current`.
    pub fn apply_to(&self, current: &ViewContent) -> ViewContent {
        ViewContent {
            info: self.info.clone().unwrap_or_else(|| current.info.clone()),
            status: self.status.clone().unwrap_or_else(|| current.status.clone()),
            keyboard: self.keyboard.clone().or_else(|| current.keyboard.clone()),
        }
    }
}

/// The two surfaces representing one actor's view of the lot.
///
/// Both surfaces are created together and deleted together.
#[derive(Debug)]
pub struct View {
    info: Box<dyn Surface>,
    status: Box<dyn Surface>,
    content: ViewContent,
    /// Set once the view left the registry; it must not be touched again.
    retired: bool,
}

impl View {
    /// Wrap two existing surfaces showing `content`.
    pub fn new(info: Box<dyn Surface>, status: Box<dyn Surface>, content: ViewContent) -> Self {
        Self {
            info,
            status,
            content,
            retired: false,
        }
    }

    /// Send both surfaces to `actor` and wrap them.
    ///
    /// If the status surface cannot be created the freshly created info
    /// surface is deleted again, so no half view is left behind.
    pub async fn open(
        factory: &dyn SurfaceFactory,
        actor: &ActorId,
        content: ViewContent,
    ) -> AppResult<Self> {
        let info = factory.create(actor, &content.info, None).await?;
        let status = match factory
            .create(actor, &content.status, content.keyboard.as_ref())
            .await
        {
            Ok(status) => status,
            Err(e) => {
                if let Err(cleanup) = info.delete().await {
                    debug!(actor = %actor, error = %cleanup, "Orphan info surface not deleted");
                }
                return Err(e);
            }
        };

        Ok(Self::new(info, status, content))
    }

    /// Content last rendered into the view.
    pub fn content(&self) -> &ViewContent {
        &self.content
    }

    /// Transport id of the info surface.
    pub fn info_id(&self) -> &str {
        self.info.id()
    }

    /// Transport id of the status surface.
    pub fn status_id(&self) -> &str {
        self.status.id()
    }

    /// Edit the surfaces in place.
    ///
    /// A keyboard-only update re-sends the cached status text with the new
    /// keyboard. A vanished surface yields `Desynchronized`.
    pub async fn update(&mut self, update: &ViewUpdate) -> AppResult<()> {
        if let Some(info) = &update.info {
            self.info.edit(info, None).await?;
            self.content.info = info.clone();
        }

        if update.status.is_some() || update.keyboard.is_some() {
            let status = update
                .status
                .clone()
                .unwrap_or_else(|| self.content.status.clone());
            let keyboard = update
                .keyboard
                .clone()
                .or_else(|| self.content.keyboard.clone());
            self.status.edit(&status, keyboard.as_ref()).await?;
            self.content.status = status;
            self.content.keyboard = keyboard;
        }

        Ok(())
    }

    /// Whether the view was removed from its registry.
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Mark the view as removed. Later updates and repairs are skipped.
    pub(crate) fn retire(&mut self) {
        self.retired = true;
    }

    /// Swap in freshly created surfaces showing `content`.
    pub(crate) fn replace(&mut self, fresh: View) {
        *self = fresh;
    }

    /// Delete both surfaces. Surfaces that are already gone are fine.
    ///
    /// Both deletes are attempted; the first non-desync failure is returned.
    pub async fn delete(&self) -> AppResult<()> {
        let info = tolerate_missing(self.info.delete().await);
        let status = tolerate_missing(self.status.delete().await);
        info.and(status)
    }
}

fn tolerate_missing(result: AppResult<()>) -> AppResult<()> {
    match result {
        Err(e) if e.is(ErrorKind::Desynchronized) => Ok(()),
        Err(e) => {
            warn!(error = %e, "Surface delete failed");
            Err(e)
        }
        Ok(()) => Ok(()),
    }
}

/// Helper for callers that only care whether an error means "surface gone".
pub fn is_desynchronized(err: &AppError) -> bool {
    err.is(ErrorKind::Desynchronized)
}
