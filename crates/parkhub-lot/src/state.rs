//! Place state and the immutable snapshot records derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parkhub_core::types::id::{ActorId, PlaceId};

/// Lifecycle state of a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceState {
    /// Nobody holds the place.
    Free,
    /// An actor has claimed the place but not arrived yet.
    Reserved,
    /// An actor is parked on the place.
    Occupied,
}

impl PlaceState {
    /// Lowercase name, as used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Reserved => "reserved",
            Self::Occupied => "occupied",
        }
    }

    /// Colored square shown for a place in this state.
    pub fn sign(&self) -> &'static str {
        match self {
            Self::Free => "\u{1F7E9}",
            Self::Reserved => "\u{1F7E8}",
            Self::Occupied => "\u{1F7E5}",
        }
    }

    /// Rank used when listing places: occupied first, free last.
    pub fn display_rank(&self) -> u8 {
        match self {
            Self::Occupied => 0,
            Self::Reserved => 1,
            Self::Free => 2,
        }
    }
}

impl std::fmt::Display for PlaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable copy of a place at one instant.
///
/// `occupant` is present iff `state != Free`, and `occupied_since` is
/// present iff `state == Occupied`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSnapshot {
    /// Place identifier.
    pub id: PlaceId,
    /// State at the time of the snapshot.
    pub state: PlaceState,
    /// Actor holding the place.
    pub occupant: Option<ActorId>,
    /// When the current occupancy started.
    pub occupied_since: Option<DateTime<Utc>>,
}

impl PlaceSnapshot {
    /// Snapshot of a free place.
    pub fn free(id: PlaceId) -> Self {
        Self {
            id,
            state: PlaceState::Free,
            occupant: None,
            occupied_since: None,
        }
    }

    /// Snapshot of a place reserved by `occupant`.
    pub fn reserved(id: PlaceId, occupant: ActorId) -> Self {
        Self {
            id,
            state: PlaceState::Reserved,
            occupant: Some(occupant),
            occupied_since: None,
        }
    }

    /// Snapshot of a place occupied by `occupant` since `since`.
    pub fn occupied(id: PlaceId, occupant: ActorId, since: DateTime<Utc>) -> Self {
        Self {
            id,
            state: PlaceState::Occupied,
            occupant: Some(occupant),
            occupied_since: Some(since),
        }
    }

    /// Whether the place was free.
    pub fn is_free(&self) -> bool {
        self.state == PlaceState::Free
    }

    /// Whether `actor` held the place.
    pub fn is_held_by(&self, actor: &ActorId) -> bool {
        self.occupant.as_ref() == Some(actor)
    }

    /// Colored square for this snapshot.
    pub fn sign(&self) -> &'static str {
        self.state.sign()
    }
}

/// A successful transition of one place, captured under the place lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State immediately before the transition.
    pub before: PlaceSnapshot,
    /// State immediately after the transition.
    pub after: PlaceSnapshot,
}
