//! Access control configuration.

use serde::{Deserialize, Serialize};

/// Whitelist mode and owner identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// When `true`, only actors already present in the directory may act.
    #[serde(default)]
    pub whitelist: bool,
    /// Actor allowed to run administrative commands.
    #[serde(default)]
    pub owner_id: Option<String>,
}
