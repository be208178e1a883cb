//! In-memory surface transport for single-process use and tests.
//!
//! Surfaces live in a shared `DashMap`. The transport can be tampered with
//! from the outside (removing surfaces as a user or platform would) and can
//! be switched offline to simulate transient transport failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::debug;
use uuid::Uuid;

use parkhub_core::error::AppError;
use parkhub_core::result::AppResult;
use parkhub_core::traits::surface::{Surface, SurfaceFactory};
use parkhub_core::types::id::ActorId;
use parkhub_core::types::keyboard::Keyboard;

/// Stored state of one surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRecord {
    /// Surface id.
    pub id: String,
    /// Recipient.
    pub actor: ActorId,
    /// Current text.
    pub text: String,
    /// Current keyboard.
    pub keyboard: Option<Keyboard>,
    /// Number of successful edits.
    pub edits: u32,
    /// Creation order across the transport.
    pub seq: u64,
}

#[derive(Debug)]
struct Shared {
    surfaces: DashMap<String, SurfaceRecord>,
    offline: AtomicBool,
    blocked: DashSet<ActorId>,
    next_seq: AtomicU64,
    /// Remaining successful creates; negative means unlimited.
    create_budget: AtomicI64,
}

impl Shared {
    fn check_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::transport("Transport is offline"));
        }
        Ok(())
    }
}

/// In-memory transport implementing [`SurfaceFactory`].
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    shared: Arc<Shared>,
}

impl MemoryTransport {
    /// Create an empty, online transport.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                surfaces: DashMap::new(),
                offline: AtomicBool::new(false),
                blocked: DashSet::new(),
                next_seq: AtomicU64::new(0),
                create_budget: AtomicI64::new(-1),
            }),
        }
    }

    /// Current state of a surface.
    pub fn surface(&self, id: &str) -> Option<SurfaceRecord> {
        self.shared.surfaces.get(id).map(|r| r.value().clone())
    }

    /// Surfaces addressed to `actor`, oldest first.
    pub fn surfaces_for(&self, actor: &ActorId) -> Vec<SurfaceRecord> {
        let mut records: Vec<SurfaceRecord> = self
            .shared
            .surfaces
            .iter()
            .filter(|r| &r.value().actor == actor)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by_key(|r| r.seq);
        records
    }

    /// Number of live surfaces.
    pub fn surface_count(&self) -> usize {
        self.shared.surfaces.len()
    }

    /// Delete a surface behind the registry's back.
    pub fn remove_surface(&self, id: &str) -> bool {
        self.shared.surfaces.remove(id).is_some()
    }

    /// Delete every surface of `actor` behind the registry's back.
    pub fn remove_actor_surfaces(&self, actor: &ActorId) -> usize {
        let ids: Vec<String> = self
            .surfaces_for(actor)
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.iter().filter(|id| self.remove_surface(id)).count()
    }

    /// Make every call fail with `Transport` while `offline` is set.
    pub fn set_offline(&self, offline: bool) {
        self.shared.offline.store(offline, Ordering::SeqCst);
    }

    /// Refuse new surfaces for `actor`, as when a user blocks the sender.
    pub fn block_actor(&self, actor: &ActorId) {
        self.shared.blocked.insert(actor.clone());
    }

    /// Accept new surfaces for `actor` again.
    pub fn unblock_actor(&self, actor: &ActorId) {
        self.shared.blocked.remove(actor);
    }

    /// Let `count` more creates succeed, then fail the rest with `Transport`.
    pub fn fail_after_creates(&self, count: u32) {
        self.shared
            .create_budget
            .store(i64::from(count), Ordering::SeqCst);
    }

    fn take_create_budget(&self) -> AppResult<()> {
        let previous = self
            .shared
            .create_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |budget| {
                if budget > 0 { Some(budget - 1) } else { None }
            });
        match previous {
            Ok(_) => Ok(()),
            Err(budget) if budget < 0 => Ok(()),
            Err(_) => Err(AppError::transport("Create budget exhausted")),
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SurfaceFactory for MemoryTransport {
    async fn create(
        &self,
        actor: &ActorId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> AppResult<Box<dyn Surface>> {
        self.shared.check_online()?;
        if self.shared.blocked.contains(actor) {
            return Err(AppError::transport(format!("Actor {actor} refuses new surfaces")));
        }
        self.take_create_budget()?;

        let id = Uuid::new_v4().to_string();
        let record = SurfaceRecord {
            id: id.clone(),
            actor: actor.clone(),
            text: text.to_string(),
            keyboard: keyboard.cloned(),
            edits: 0,
            seq: self.shared.next_seq.fetch_add(1, Ordering::SeqCst),
        };
        self.shared.surfaces.insert(id.clone(), record);
        debug!(surface = %id, actor = %actor, "Surface created");

        Ok(Box::new(MemorySurface {
            id,
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Handle to a surface stored in a [`MemoryTransport`].
#[derive(Debug)]
pub struct MemorySurface {
    id: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl Surface for MemorySurface {
    fn id(&self) -> &str {
        &self.id
    }

    async fn edit(&self, text: &str, keyboard: Option<&Keyboard>) -> AppResult<()> {
        self.shared.check_online()?;
        let mut record = self
            .shared
            .surfaces
            .get_mut(&self.id)
            .ok_or_else(|| AppError::desynchronized(format!("Surface {} not found", self.id)))?;
        record.text = text.to_string();
        if let Some(keyboard) = keyboard {
            record.keyboard = Some(keyboard.clone());
        }
        record.edits += 1;
        Ok(())
    }

    async fn delete(&self) -> AppResult<()> {
        self.shared.check_online()?;
        self.shared
            .surfaces
            .remove(&self.id)
            .map(|_| ())
            .ok_or_else(|| AppError::desynchronized(format!("Surface {} not found", self.id)))
    }
}
