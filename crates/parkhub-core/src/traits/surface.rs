//! Messaging transport traits.
//!
//! A surface is one remotely rendered message. Every call is a fallible
//! remote call: implementations report a vanished surface with
//! [`ErrorKind::Desynchronized`](crate::error::ErrorKind::Desynchronized)
//! and transient failures with
//! [`ErrorKind::Transport`](crate::error::ErrorKind::Transport).

use std::fmt;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::ActorId;
use crate::types::keyboard::Keyboard;

/// Handle to a single externally rendered message.
#[async_trait]
pub trait Surface: Send + Sync + fmt::Debug + 'static {
    /// Transport-specific identifier of the surface.
    fn id(&self) -> &str;

    /// Replace the surface text and, when given, its keyboard.
    async fn edit(&self, text: &str, keyboard: Option<&Keyboard>) -> AppResult<()>;

    /// Remove the surface from the remote side.
    async fn delete(&self) -> AppResult<()>;
}

/// Creates new surfaces addressed to an actor.
#[async_trait]
pub trait SurfaceFactory: Send + Sync + 'static {
    /// Send a new message to `actor` and return a handle to it.
    async fn create(
        &self,
        actor: &ActorId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> AppResult<Box<dyn Surface>>;
}
