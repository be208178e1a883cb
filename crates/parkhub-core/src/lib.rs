//! # parkhub-core
//!
//! Core crate for ParkHub. Contains the unified error system, configuration
//! schemas, typed identifiers, the keyboard render object, and the traits
//! implemented by the transport and persistence collaborators.
//!
//! This crate has **no** internal dependencies on other ParkHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
