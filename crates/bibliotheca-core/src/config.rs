use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::EntityKind;

/// Root application configuration, loaded from `~/.config/bibliotheca/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot document written by `save_state` and read by `load_state`.
    pub state_path: String,
    /// Directory for exports when no explicit target is given.
    pub export_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` level filter, overridden by `RUST_LOG`.
    pub level: String,
    /// Echo library events to stdout.
    pub console: bool,
    /// Forward library events to the `tracing` subscriber.
    pub tracing_events: bool,
    /// Append library events to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

// ─── Defaults ──────────────────────────────────────────────

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("bibliotheca")
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            state_path: data_dir.join("library_state.json").to_string_lossy().to_string(),
            export_dir: data_dir.join("exports").to_string_lossy().to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            tracing_events: false,
            log_file: Some(data_dir().join("library.log").to_string_lossy().to_string()),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/bibliotheca/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BIBLIOTHECA_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bibliotheca")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    // ─── Derived paths ─────────────────────────────────────

    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.state_path)
    }

    pub fn set_state_path(&mut self, path: PathBuf) {
        self.storage.state_path = path.to_string_lossy().to_string();
    }

    /// Default export target, e.g. `<export_dir>/books_export.csv`.
    pub fn export_path(&self, kind: EntityKind, extension: &str) -> PathBuf {
        PathBuf::from(&self.storage.export_dir).join(format!("{kind}_export.{extension}"))
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.logging.log_file.as_ref().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.console);
        assert!(cfg.state_path().ends_with("library_state.json"));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.logging.console = false;
        cfg.logging.log_file = None;
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(!loaded.logging.console);
        assert!(loaded.logging.log_file.is_none());
        assert_eq!(loaded.storage.state_path, cfg.storage.state_path);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\nstate_path = \"/tmp/lib.json\"\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.state_path(), PathBuf::from("/tmp/lib.json"));
        assert_eq!(loaded.logging.level, "info");
        assert!(!loaded.storage.export_dir.is_empty());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let dir = TempDir::new().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_export_path() {
        let mut cfg = AppConfig::default();
        cfg.storage.export_dir = "/srv/exports".to_string();
        assert_eq!(
            cfg.export_path(EntityKind::Readers, "csv"),
            PathBuf::from("/srv/exports/readers_export.csv")
        );
    }
}
