//! Ranked statistics report.

use serde::{Deserialize, Serialize};

/// One row of a ranked table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Counted key.
    pub key: String,
    /// Text to show for the key; the display name for actors.
    pub label: String,
    /// Count for the key.
    pub count: u64,
}

/// Statistics ready for rendering. Every table is sorted by count,
/// descending, with ties in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedReport {
    /// Occupancies per place.
    pub places: Vec<RankedEntry>,
    /// Occupancies per actor.
    pub actors: Vec<RankedEntry>,
    /// Occupancies per weekday.
    pub weekdays: Vec<RankedEntry>,
    /// Occupancies per month.
    pub months: Vec<RankedEntry>,
    /// Sum of the per-place counts.
    pub total_reservations: u64,
    /// Raw accumulated occupied time.
    pub total_occupied_seconds: f64,
    /// Occupied time as `H:MM`.
    pub total_time: String,
}

/// Format seconds as `H:MM`, dropping leftover seconds. Hours are not
/// folded into days.
pub fn format_duration(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    format!("{hours}:{minutes:02}")
}
