//! Serializable form of the whole statistics state.

use serde::{Deserialize, Serialize};

use parkhub_core::error::AppError;
use parkhub_core::traits::directory::ActorNames;

use crate::rank::RankTable;

/// Complete statistics state, used for backup/restore and checkpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsExport {
    /// Occupancies per place id.
    #[serde(default)]
    pub by_place: RankTable,
    /// Occupancies per actor id.
    #[serde(default)]
    pub by_actor: RankTable,
    /// Occupancies per weekday name.
    #[serde(default)]
    pub by_weekday: RankTable,
    /// Occupancies per month name.
    #[serde(default)]
    pub by_month: RankTable,
    /// Accumulated occupied time in seconds.
    #[serde(default)]
    pub total_occupied_seconds: f64,
    /// Display names of every actor ever seen.
    #[serde(default)]
    pub actor_directory: ActorNames,
}

impl StatsExport {
    /// Parse an export from JSON.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let export: Self = serde_json::from_str(json)?;
        if !export.total_occupied_seconds.is_finite() || export.total_occupied_seconds < 0.0 {
            return Err(AppError::validation(
                "total_occupied_seconds must be a non-negative number",
            ));
        }
        Ok(export)
    }

    /// Render the export as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
