//! Runtime configuration: TOML file under the quorum home directory.

pub mod schema;

pub use schema::QuorumConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default quorum home directory (~/.quorum).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".quorum"))
        .unwrap_or_else(|| PathBuf::from(".quorum"))
}

impl QuorumConfig {
    /// Read the config at `path`. A missing file yields the defaults so
    /// read-only commands work before `quorum init` has run.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Malformed TOML in {}", path.display()))
    }

    /// Write the config to `path` as pretty TOML, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Config serialization failed")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Could not write config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = QuorumConfig::load(Path::new("/nonexistent/quorum.toml")).unwrap();
        assert_eq!(cfg.cycle_interval_secs, 600);
        assert_eq!(cfg.store_backend, "sqlite");
        assert_eq!(cfg.context_window, 5);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = std::env::temp_dir().join(format!("quorum-config-{}", ulid::Ulid::new()));
        let path = dir.join("quorum.toml");

        let mut cfg = QuorumConfig::default();
        cfg.name = "ops".into();
        cfg.cycle_interval_secs = 120;
        cfg.social_handle = "quorum_dao".into();
        cfg.save(&path).unwrap();

        let loaded = QuorumConfig::load(&path).unwrap();
        assert_eq!(loaded.name, "ops");
        assert_eq!(loaded.cycle_interval_secs, 120);
        assert_eq!(loaded.social_handle, "quorum_dao");

        let _ = std::fs::remove_dir_all(dir);
    }
}
