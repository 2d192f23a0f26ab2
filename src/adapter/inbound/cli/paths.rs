//! Default locations.
//!
//! The keeper looks for `~/.rebalance-keeper/config.toml` unless `--config`
//! says otherwise. The database path comes from `[registry] database`.

use std::path::PathBuf;

/// Returns the keeper home directory (`~/.rebalance-keeper/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rebalance-keeper")
}

pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lives_under_keeper_home() {
        let config = default_config();
        assert!(config.starts_with(home_dir()));
        assert!(config.ends_with("config.toml"));
    }
}
