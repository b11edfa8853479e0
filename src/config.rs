/// Application configuration
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/photo-attachments/config.json
/// - macOS: ~/Library/Application Support/photo-attachments/config.json
/// - Windows: %APPDATA%\photo-attachments\config.json
///
/// Every field has a default, so a partial file (or no file at all) works.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::photo::decode::DEFAULT_THUMBNAIL_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum number of selected photos (None = unlimited)
    pub selection_limit: Option<usize>,
    /// Longest edge of decoded previews, in pixels
    pub thumbnail_size: u32,
    /// File extensions offered by the picker (lowercase, no dot)
    pub extensions: Vec<String>,
    /// Descend into subfolders when adding a folder
    pub recursive_folders: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            selection_limit: None,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            extensions: ["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            recursive_folders: true,
        }
    }
}

impl AppConfig {
    /// Load from an explicit path, or from the default location.
    /// A missing file at the default location yields the defaults;
    /// a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Get the path where the config file is expected
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("photo-attachments");
        path.push("config.json");
        Some(path)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether a path has one of the configured image extensions
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "selection_limit": 5 }"#).unwrap();
        assert_eq!(config.selection_limit, Some(5));
        assert_eq!(config.thumbnail_size, DEFAULT_THUMBNAIL_SIZE);
        assert!(config.recursive_folders);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/config.json")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = AppConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn accepts_is_case_insensitive() {
        let config = AppConfig::default();
        assert!(config.accepts(Path::new("/photos/IMG_0001.JPG")));
        assert!(config.accepts(Path::new("scan.png")));
        assert!(!config.accepts(Path::new("notes.txt")));
        assert!(!config.accepts(Path::new("no_extension")));
    }
}
