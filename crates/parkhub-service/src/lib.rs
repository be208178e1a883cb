//! # parkhub-service
//!
//! The dispatcher layer of ParkHub. Turns actor actions (commands and
//! keyboard presses) into place transitions, statistics events and view
//! updates:
//!
//! - [`ParkingService`]: start/stop, place presses, reservation cancel,
//!   lot clear, statistics, and the owner-only admin commands
//! - [`Action`]: keyboard callback data parsing
//! - [`AccessPolicy`]: whitelist mode and owner checks
//! - [`ActorDirectory`]: display names of known actors, persisted on change
//! - [`render`]: status text, keyboards and the statistics message

pub mod access;
pub mod action;
pub mod admin;
pub mod context;
pub mod directory;
pub mod parking;
pub mod render;

pub use access::AccessPolicy;
pub use action::Action;
pub use context::ActorContext;
pub use directory::ActorDirectory;
pub use parking::{ParkingService, ServiceSettings};
