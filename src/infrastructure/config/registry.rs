//! Target registry configuration.

use serde::Deserialize;

/// Which registry implementation backs the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Targets tracked in the SQLite database.
    #[default]
    Sqlite,
    /// Targets listed in the config file, kept in memory.
    Static,
}

/// One target declared in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticTarget {
    pub id: String,
    pub kind: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

/// Registry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub backend: RegistryBackend,
    /// Path to the SQLite database file. Also holds pass history.
    #[serde(default = "default_database_path")]
    pub database: String,
    /// Targets for the static backend.
    #[serde(default)]
    pub targets: Vec<StaticTarget>,
}

fn default_database_path() -> String {
    "rebalance-keeper.db".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            backend: RegistryBackend::default(),
            database: default_database_path(),
            targets: Vec::new(),
        }
    }
}
