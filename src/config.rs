//! # Configuration Module
//!
//! Resolves where the feature table is read from and where the playlist is
//! written to. Values come from, in increasing priority:
//!
//! 1. Built-in defaults (relative to the working directory)
//! 2. An optional JSON file in the platform config directory
//! 3. Command-line flags (`--table`, `--playlist`)
//!
//! Config file location:
//! - Linux: `~/.config/curate/config.json`
//! - macOS: `~/Library/Application Support/curate/config.json`
//! - Windows: `%APPDATA%\curate\config.json`
//!
//! ```json
//! { "table_path": "/home/me/Music/data/features.csv", "preview_count": 5 }
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default feature table, relative to the collection root.
pub const DEFAULT_TABLE_PATH: &str = "data/audio_essentia_features_5.csv";
/// Default playlist file, one directory below the collection root.
pub const DEFAULT_PLAYLIST_PATH: &str = "playlists/streamlit.m3u8";
/// Number of tracks listed as a preview after each run.
pub const DEFAULT_PREVIEW_COUNT: usize = 10;

/// Returns the path of the optional config file, if the platform has a config directory.
#[must_use]
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("curate").join("config.json"))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Feature table CSV
    pub table_path: PathBuf,
    /// Playlist file, overwritten on every run
    pub playlist_path: PathBuf,
    /// How many of the selected tracks to preview
    pub preview_count: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            playlist_path: PathBuf::from(DEFAULT_PLAYLIST_PATH),
            preview_count: DEFAULT_PREVIEW_COUNT,
        }
    }
}

impl RuntimeConfig {
    /// Load the user config file if present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from an explicit JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading config from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| {
            format!(
                "Config file {} is not valid JSON. Please fix or remove it.",
                path.display()
            )
        })
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, table: Option<PathBuf>, playlist: Option<PathBuf>) -> Self {
        if let Some(table) = table {
            self.table_path = table;
        }
        if let Some(playlist) = playlist {
            self.playlist_path = playlist;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.table_path, PathBuf::from(DEFAULT_TABLE_PATH));
        assert_eq!(config.playlist_path, PathBuf::from(DEFAULT_PLAYLIST_PATH));
        assert_eq!(config.preview_count, 10);
    }

    #[test]
    fn test_config_path_structure() {
        if let Some(path) = get_config_path() {
            assert!(path.ends_with("curate/config.json"));
        }
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"preview_count": 3}"#).unwrap();

        let config = RuntimeConfig::from_file(&path).unwrap();
        assert_eq!(config.preview_count, 3);
        assert_eq!(config.table_path, PathBuf::from(DEFAULT_TABLE_PATH));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = RuntimeConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_overrides_take_priority() {
        let config = RuntimeConfig::default()
            .with_overrides(Some(PathBuf::from("t.csv")), None);
        assert_eq!(config.table_path, PathBuf::from("t.csv"));
        assert_eq!(config.playlist_path, PathBuf::from(DEFAULT_PLAYLIST_PATH));
    }
}
