//! Configuration loading and management
//!
//! Handles parsing of the optional `config.toml` in the platform
//! config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,

    /// Board UI settings
    #[serde(default)]
    pub ui: UiConfig,

    /// Event stream settings
    #[serde(default)]
    pub events: EventsConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Override for the directory holding the tasks file
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Board UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Reload the board when the tasks file changes on disk
    #[serde(default = "default_watch")]
    pub watch: bool,

    /// Terminal event poll interval in milliseconds
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
}

fn default_watch() -> bool {
    true
}

fn default_poll_ms() -> u64 {
    120
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            watch: default_watch(),
            poll_ms: default_poll_ms(),
        }
    }
}

/// Event stream configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Default event destination: a file path, or `-` for stdout
    #[serde(default)]
    pub destination: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a path, or return defaults when the
    /// file does not exist. A file that exists but fails to parse or
    /// validate is an error, not a silent fallback.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from the platform config directory
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Platform location of `config.toml`, if one can be determined
    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "tb")?;
        Some(dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if !(10..=10_000).contains(&self.ui.poll_ms) {
            return Err(Error::InvalidConfig(format!(
                "ui.poll_ms must be between 10 and 10000, got {}",
                self.ui.poll_ms
            )));
        }
        if let Some(dir) = &self.data.dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::InvalidConfig(
                    "data.dir cannot be empty".to_string(),
                ));
            }
        }
        if let Some(destination) = &self.events.destination {
            if destination.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "events.destination cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Resolve the directory holding the tasks file.
///
/// Precedence: `--data-dir` flag (or `TB_DATA_DIR`), then `data.dir`
/// from config, then the platform data directory.
pub fn resolve_data_dir(cli_dir: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = &config.data.dir {
        return Ok(dir.clone());
    }
    let dirs = directories::ProjectDirs::from("", "", "tb").ok_or_else(|| {
        Error::NoDataDir("no home directory available; pass --data-dir".to_string())
    })?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.data.dir, None);
        assert!(cfg.ui.watch);
        assert_eq!(cfg.ui.poll_ms, 120);
        assert_eq!(cfg.events.destination, None);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let content = r#"
[data]
dir = "/tmp/tb-data"

[ui]
watch = false
poll_ms = 250

[events]
destination = "-"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.data.dir, Some(PathBuf::from("/tmp/tb-data")));
        assert!(!cfg.ui.watch);
        assert_eq!(cfg.ui.poll_ms, 250);
        assert_eq!(cfg.events.destination, Some("-".to_string()));
    }

    #[test]
    fn partial_files_keep_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui]\npoll_ms = 500\n").expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.ui.poll_ms, 500);
        assert!(cfg.ui.watch);
        assert_eq!(cfg.data.dir, None);
    }

    #[test]
    fn out_of_range_poll_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui]\npoll_ms = 5\n").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            Error::InvalidConfig(message) => assert!(message.contains("ui.poll_ms")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_or_default_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let cfg = Config::load_or_default(&path).expect("defaults");
        assert_eq!(cfg.ui.poll_ms, 120);
    }

    #[test]
    fn load_or_default_surfaces_invalid_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "not valid toml [[").expect("write config");

        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn data_dir_precedence() {
        let cli = PathBuf::from("/tmp/from-flag");
        let mut cfg = Config::default();
        cfg.data.dir = Some(PathBuf::from("/tmp/from-config"));

        let resolved = resolve_data_dir(Some(&cli), &cfg).expect("resolve");
        assert_eq!(resolved, cli);

        let resolved = resolve_data_dir(None, &cfg).expect("resolve");
        assert_eq!(resolved, PathBuf::from("/tmp/from-config"));
    }
}
