//! Whitelist mode and owner checks.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use parkhub_core::config::AccessConfig;
use parkhub_core::error::AppError;
use parkhub_core::result::AppResult;
use parkhub_core::types::id::ActorId;

/// Decides which actors may act and which may administer.
#[derive(Debug)]
pub struct AccessPolicy {
    whitelist: AtomicBool,
    owner: Option<ActorId>,
}

impl AccessPolicy {
    /// Create a policy.
    pub fn new(whitelist: bool, owner: Option<ActorId>) -> Self {
        Self {
            whitelist: AtomicBool::new(whitelist),
            owner,
        }
    }

    /// Build a policy from configuration.
    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(config.whitelist, config.owner_id.clone().map(ActorId::from))
    }

    /// Whether whitelist mode is on.
    pub fn whitelist(&self) -> bool {
        self.whitelist.load(Ordering::SeqCst)
    }

    /// Flip whitelist mode and return the new mode.
    pub fn toggle_whitelist(&self) -> bool {
        let enabled = !self.whitelist.fetch_xor(true, Ordering::SeqCst);
        info!(enabled, "Whitelist mode toggled");
        enabled
    }

    /// Check that `actor` may use the lot. `known` tells whether the actor
    /// is already in the directory.
    pub fn check(&self, actor: &ActorId, known: bool) -> AppResult<()> {
        if self.whitelist() && !known {
            warn!(actor = %actor, "Actor outside the whitelist ignored");
            return Err(AppError::authorization(format!(
                "Actor {actor} is not whitelisted"
            )));
        }
        Ok(())
    }

    /// Whether `actor` is the owner.
    pub fn is_owner(&self, actor: &ActorId) -> bool {
        self.owner.as_ref() == Some(actor)
    }

    /// Check that `actor` is the owner.
    pub fn require_owner(&self, actor: &ActorId, command: &str) -> AppResult<()> {
        if self.is_owner(actor) {
            return Ok(());
        }
        warn!(actor = %actor, command, "Owner command from non-owner");
        Err(AppError::authorization(format!(
            "Command '{command}' is reserved for the owner"
        )))
    }
}
