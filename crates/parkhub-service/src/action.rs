//! Keyboard callback data.

use parkhub_core::types::id::PlaceId;

/// Callback prefix of the cancel-reservation button.
pub const CANCEL_PREFIX: &str = "cancel.";
/// Callback of the clear-lot button.
pub const CLEAR: &str = "clear";
/// Callback of the statistics button.
pub const STATISTICS: &str = "statistics";

/// Action requested by a keyboard press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Toggle a place.
    Place(PlaceId),
    /// Cancel the actor's reservation of a place.
    Cancel(PlaceId),
    /// Free the whole lot.
    Clear,
    /// Show statistics to the actor.
    Statistics,
}

impl Action {
    /// Parse callback data. Anything that is not a known command is taken
    /// as a place id.
    pub fn parse(data: &str) -> Self {
        match data {
            CLEAR => Self::Clear,
            STATISTICS => Self::Statistics,
            _ => match data.strip_prefix(CANCEL_PREFIX) {
                Some(id) => Self::Cancel(PlaceId::from(id)),
                None => Self::Place(PlaceId::from(data)),
            },
        }
    }

    /// Callback data for this action.
    pub fn callback(&self) -> String {
        match self {
            Self::Place(id) => id.to_string(),
            Self::Cancel(id) => format!("{CANCEL_PREFIX}{id}"),
            Self::Clear => CLEAR.to_string(),
            Self::Statistics => STATISTICS.to_string(),
        }
    }
}
