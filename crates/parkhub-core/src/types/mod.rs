//! Shared domain types.

pub mod id;
pub mod keyboard;

pub use id::{ActorId, PlaceId};
pub use keyboard::{Button, Keyboard};
