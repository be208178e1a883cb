//! Collaborator traits defined in `parkhub-core` and implemented by other crates.

pub mod directory;
pub mod surface;

pub use directory::{ActorNames, DirectoryStore};
pub use surface::{Surface, SurfaceFactory};
