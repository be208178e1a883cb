//! # parkhub-storage
//!
//! File-backed implementations of the persistence traits:
//!
//! - [`JsonDirectoryStore`]: the actor directory (`actor id -> display name`)
//! - [`JsonStatsStore`]: the statistics checkpoint

pub mod directory;
pub mod file;
pub mod stats;

pub use directory::JsonDirectoryStore;
pub use stats::JsonStatsStore;
