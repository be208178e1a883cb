//! Single parking place and its reservation state machine.
//!
//! A place cycles `Free -> Reserved -> Occupied -> Free`. Once it leaves
//! `Free` only the actor who claimed it may move it further; anybody else
//! gets a `Conflict` and the place is left untouched. Each place carries
//! its own Tokio mutex, so the read of the current state and the write of
//! the next one happen inside a single critical section.

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use parkhub_core::error::AppError;
use parkhub_core::result::AppResult;
use parkhub_core::types::id::{ActorId, PlaceId};

use crate::state::{PlaceSnapshot, Transition};

/// Internal state of a place. The variants make the occupant and
/// occupancy-start invariants structural.
#[derive(Debug, Clone)]
pub(crate) enum Occupancy {
    Free,
    Reserved {
        occupant: ActorId,
    },
    Occupied {
        occupant: ActorId,
        since: DateTime<Utc>,
    },
}

impl Occupancy {
    pub(crate) fn snapshot(&self, id: &PlaceId) -> PlaceSnapshot {
        match self {
            Self::Free => PlaceSnapshot::free(id.clone()),
            Self::Reserved { occupant } => PlaceSnapshot::reserved(id.clone(), occupant.clone()),
            Self::Occupied { occupant, since } => {
                PlaceSnapshot::occupied(id.clone(), occupant.clone(), *since)
            }
        }
    }

    pub(crate) fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// A single reservable parking place.
#[derive(Debug)]
pub struct Place {
    /// Identifier, fixed at construction.
    id: PlaceId,
    /// Protected state.
    occupancy: Mutex<Occupancy>,
}

impl Place {
    /// Create a free place.
    pub fn new(id: impl Into<PlaceId>) -> Self {
        Self {
            id: id.into(),
            occupancy: Mutex::new(Occupancy::Free),
        }
    }

    /// Place identifier.
    pub fn id(&self) -> &PlaceId {
        &self.id
    }

    /// Current state of the place.
    pub async fn snapshot(&self) -> PlaceSnapshot {
        self.occupancy.lock().await.snapshot(&self.id)
    }

    /// Advance the place one step on behalf of `actor`.
    ///
    /// - `Free` becomes `Reserved` by `actor`
    /// - `Reserved` by `actor` becomes `Occupied` starting now
    /// - `Occupied` by `actor` becomes `Free`
    ///
    /// A place held by someone else yields `Conflict` without mutation.
    pub async fn toggle(&self, actor: &ActorId) -> AppResult<Transition> {
        self.toggle_at(actor, Utc::now()).await
    }

    /// Same as [`toggle`](Self::toggle) with an explicit clock reading.
    pub async fn toggle_at(&self, actor: &ActorId, now: DateTime<Utc>) -> AppResult<Transition> {
        let mut occupancy = self.occupancy.lock().await;
        let before = occupancy.snapshot(&self.id);

        let next = match &*occupancy {
            Occupancy::Free => Occupancy::Reserved {
                occupant: actor.clone(),
            },
            Occupancy::Reserved { occupant } if occupant == actor => Occupancy::Occupied {
                occupant: actor.clone(),
                since: now,
            },
            Occupancy::Occupied { occupant, .. } if occupant == actor => Occupancy::Free,
            Occupancy::Reserved { .. } | Occupancy::Occupied { .. } => {
                debug!(place = %self.id, actor = %actor, state = %before.state, "Toggle rejected");
                return Err(AppError::conflict(format!(
                    "Place {} is held by another actor",
                    self.id
                )));
            }
        };

        *occupancy = next;
        let after = occupancy.snapshot(&self.id);
        info!(
            place = %self.id,
            actor = %actor,
            from = %before.state,
            to = %after.state,
            "Place toggled"
        );

        Ok(Transition { before, after })
    }

    /// Drop a reservation held by `actor`.
    ///
    /// Only valid while the place is `Reserved` by `actor`; anything else
    /// (a stale keyboard, someone else's reservation) is a `Conflict`.
    pub async fn cancel_reservation(&self, actor: &ActorId) -> AppResult<Transition> {
        let mut occupancy = self.occupancy.lock().await;

        match &*occupancy {
            Occupancy::Reserved { occupant } if occupant == actor => {}
            _ => {
                debug!(place = %self.id, actor = %actor, "Cancel rejected");
                return Err(AppError::conflict(format!(
                    "Place {} is not reserved by this actor",
                    self.id
                )));
            }
        }

        let before = occupancy.snapshot(&self.id);
        *occupancy = Occupancy::Free;
        info!(place = %self.id, actor = %actor, "Reservation cancelled");

        Ok(Transition {
            before,
            after: PlaceSnapshot::free(self.id.clone()),
        })
    }

    /// Reset the place to `Free` without any ownership check.
    pub async fn force_clear(&self) -> Transition {
        let mut occupancy = self.occupancy.lock().await;
        Self::clear_locked(&self.id, &mut occupancy)
    }

    /// Lock the place state. Used by [`Lot`](crate::Lot) for ordered
    /// whole-lot critical sections.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Occupancy> {
        self.occupancy.lock().await
    }

    pub(crate) fn clear_locked(id: &PlaceId, occupancy: &mut Occupancy) -> Transition {
        let before = occupancy.snapshot(id);
        *occupancy = Occupancy::Free;
        if !before.is_free() {
            info!(place = %id, from = %before.state, "Place force-cleared");
        }
        Transition {
            before,
            after: PlaceSnapshot::free(id.clone()),
        }
    }
}
