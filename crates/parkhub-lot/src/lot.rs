//! The parking lot: a fixed, ordered set of places.
//!
//! Whole-lot operations ([`Lot::snapshot`], [`Lot::clear`]) lock every
//! place in declaration order and hold all guards together, so they observe
//! and act on a single consistent instant. Single-place transitions only
//! ever take one lock, so the fixed order rules out deadlocks.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use parkhub_core::error::AppError;
use parkhub_core::result::AppResult;
use parkhub_core::types::id::PlaceId;

use crate::place::Place;
use crate::state::{PlaceSnapshot, PlaceState};

/// The managed set of places.
#[derive(Debug)]
pub struct Lot {
    places: Vec<Place>,
}

impl Lot {
    /// Build a lot with all places free.
    ///
    /// Ids must be unique and non-blank; order is kept for rendering.
    pub fn new<I, S>(ids: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<PlaceId>,
    {
        let mut seen = HashSet::new();
        let mut places = Vec::new();

        for id in ids {
            let id: PlaceId = id.into();
            if id.as_str().trim().is_empty() {
                return Err(AppError::validation("Place id must not be blank"));
            }
            if !seen.insert(id.clone()) {
                return Err(AppError::validation(format!("Duplicate place id '{id}'")));
            }
            places.push(Place::new(id));
        }

        if places.is_empty() {
            return Err(AppError::validation("A lot needs at least one place"));
        }

        info!(places = places.len(), "Lot created");
        Ok(Self { places })
    }

    /// Places in declaration order.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Number of places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Always `false`; a lot cannot be built without places.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Look up a place by id.
    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id().as_str() == id)
    }

    /// Look up a place by id, failing with `NotFound`.
    pub fn get(&self, id: &str) -> AppResult<&Place> {
        self.place(id)
            .ok_or_else(|| AppError::not_found(format!("Unknown place '{id}'")))
    }

    /// Consistent snapshot of every place.
    pub async fn snapshot(&self) -> LotSnapshot {
        let mut guards = Vec::with_capacity(self.places.len());
        for place in &self.places {
            guards.push(place.lock().await);
        }

        let places = self
            .places
            .iter()
            .zip(&guards)
            .map(|(place, occupancy)| occupancy.snapshot(place.id()))
            .collect();

        LotSnapshot { places }
    }

    /// Whether every place is free at one instant.
    pub async fn is_free(&self) -> bool {
        let mut guards = Vec::with_capacity(self.places.len());
        for place in &self.places {
            guards.push(place.lock().await);
        }
        guards.iter().all(|occupancy| occupancy.is_free())
    }

    /// Free every held place without ownership checks.
    ///
    /// Returns the pre-clear snapshots of the places that were held, in lot
    /// order, for statistics. Fails with `NoOp` when the lot is already free.
    pub async fn clear(&self) -> AppResult<Vec<PlaceSnapshot>> {
        let mut guards = Vec::with_capacity(self.places.len());
        for place in &self.places {
            guards.push(place.lock().await);
        }

        if guards.iter().all(|occupancy| occupancy.is_free()) {
            return Err(AppError::no_op("Lot is already free"));
        }

        let mut cleared = Vec::new();
        for (place, occupancy) in self.places.iter().zip(guards.iter_mut()) {
            if occupancy.is_free() {
                continue;
            }
            let transition = Place::clear_locked(place.id(), occupancy);
            cleared.push(transition.before);
        }

        info!(cleared = cleared.len(), "Lot cleared");
        Ok(cleared)
    }
}

/// Point-in-time view of the whole lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSnapshot {
    /// Place snapshots in lot order.
    pub places: Vec<PlaceSnapshot>,
}

impl LotSnapshot {
    /// Whether every place was free.
    pub fn is_free(&self) -> bool {
        self.places.iter().all(PlaceSnapshot::is_free)
    }

    /// Snapshot of one place.
    pub fn get(&self, id: &str) -> Option<&PlaceSnapshot> {
        self.places.iter().find(|p| p.id.as_str() == id)
    }

    /// Iterate over places in lot order.
    pub fn iter(&self) -> impl Iterator<Item = &PlaceSnapshot> {
        self.places.iter()
    }

    /// Number of places in the given state.
    pub fn count(&self, state: PlaceState) -> usize {
        self.places.iter().filter(|p| p.state == state).count()
    }
}
