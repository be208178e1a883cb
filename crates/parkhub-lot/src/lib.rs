//! # parkhub-lot
//!
//! The shared-mutable core of ParkHub:
//!
//! - [`Place`]: a single reservable slot with a `Free -> Reserved -> Occupied -> Free`
//!   lifecycle, guarded by its own lock so that every transition is atomic
//! - [`Lot`]: the fixed, ordered set of places with whole-lot snapshots and
//!   the administrative clear
//! - [`PlaceSnapshot`] / [`Transition`]: immutable records of place state
//!   handed to statistics and rendering

pub mod lot;
pub mod place;
pub mod state;

pub use lot::{Lot, LotSnapshot};
pub use place::Place;
pub use state::{PlaceSnapshot, PlaceState, Transition};
