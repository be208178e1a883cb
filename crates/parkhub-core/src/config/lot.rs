//! Parking lot layout configuration.

use serde::{Deserialize, Serialize};

/// Parking lot layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotConfig {
    /// Ordered place identifiers. Changing this list rebuilds the lot.
    pub places: Vec<String>,
}
