//! Application configuration schemas.
//!
//! All configuration structs are deserialized from a TOML file via the
//! `config` crate, overlaid with `PARKHUB__*` environment variables. Each
//! sub-module represents a logical configuration section.

pub mod access;
pub mod logging;
pub mod lot;
pub mod storage;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use self::access::AccessConfig;
pub use self::logging::LoggingConfig;
pub use self::lot::LotConfig;
pub use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Parking lot layout.
    pub lot: LotConfig,
    /// Whitelist and owner settings.
    #[serde(default)]
    pub access: AccessConfig,
    /// Persistence file locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is merged with environment variables prefixed with
    /// `PARKHUB` (sections separated by `__`, e.g. `PARKHUB__ACCESS__WHITELIST`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PARKHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("lot.places")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.lot.places.is_empty() {
            return Err(AppError::configuration("lot.places must not be empty"));
        }

        let mut seen = HashSet::new();
        for place in &self.lot.places {
            if place.trim().is_empty() {
                return Err(AppError::configuration("lot.places contains a blank id"));
            }
            if !seen.insert(place.as_str()) {
                return Err(AppError::configuration(format!(
                    "lot.places contains duplicate id '{place}'"
                )));
            }
        }

        Ok(())
    }
}
