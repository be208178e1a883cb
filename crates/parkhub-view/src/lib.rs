//! # parkhub-view
//!
//! Keeps every subscribed actor's rendering of the lot in sync:
//!
//! - [`View`]: the pair of surfaces (info + status) owned by one actor,
//!   together with the content last rendered into them
//! - [`ViewRegistry`]: actor id to view map with update-in-place, delete,
//!   repair-by-recreation when a surface vanished, and broadcast
//! - [`MemoryTransport`]: an in-process surface transport for the console
//!   front end and tests

pub mod memory;
pub mod registry;
pub mod view;

pub use memory::{MemoryTransport, SurfaceRecord};
pub use registry::{NotifyOutcome, RefreshOutcome, ViewRegistry};
pub use view::{View, ViewContent, ViewUpdate};
