//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use st_core::{DEFAULT_EXPORT_CAPACITY, DEFAULT_HOME_MAP};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Map name on which exports are admitted.
    pub home_map: String,
    /// Capacity of the in-memory export queue.
    pub export_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("stash.db"),
            home_map: DEFAULT_HOME_MAP.to_string(),
            export_queue_capacity: DEFAULT_EXPORT_CAPACITY,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (STASH_*)
        figment = figment.merge(Env::prefixed("STASH_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for stash.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stash"))
}

/// Returns the platform-specific data directory for stash.
///
/// On Linux: `~/.local/share/stash`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("stash"))
}
