//! Persistence file configuration.

use serde::{Deserialize, Serialize};

/// Locations of the files ParkHub persists between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the actor directory (`actor id -> display name`).
    #[serde(default = "default_users_file")]
    pub users_file: String,
    /// JSON file holding the statistics checkpoint.
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
            data_file: default_data_file(),
        }
    }
}

fn default_users_file() -> String {
    "data/users.json".to_string()
}

fn default_data_file() -> String {
    "data/stats.json".to_string()
}
