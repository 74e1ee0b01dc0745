use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::engine::EngineSettings;
use crate::locale::LANGUAGE_KEY;
use crate::storage::{PREFERENCE_COLLECTION, THEME_PREFERENCE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
}

pub const APP_DIR: &str = "campus-companion";
const APP_CONFIG_FILE: &str = "config.json";
const CACHE_FILE: &str = "preferences.json";
const REMOTE_DIR: &str = "remote";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme_preference_key: String,
    pub remote_collection: String,
    pub language_key: String,
    pub desktop_notifications: bool,
    pub remote_root: Option<PathBuf>,
    pub cache_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme_preference_key: THEME_PREFERENCE_KEY.to_string(),
            remote_collection: PREFERENCE_COLLECTION.to_string(),
            language_key: LANGUAGE_KEY.to_string(),
            desktop_notifications: true,
            remote_root: None,
            cache_file: None,
        }
    }
}

impl AppConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            preference_key: self.theme_preference_key.clone(),
            remote_collection: self.remote_collection.clone(),
        }
    }

    /// Local cache file; `preferences.json` next to `config.json` by default.
    pub fn cache_path(&self) -> Result<PathBuf, ConfigPathError> {
        self.cache_file
            .clone()
            .map_or_else(|| default_app_path(CACHE_FILE), Ok)
    }

    /// Root of the file-backed remote document store.
    pub fn remote_root_path(&self) -> Result<PathBuf, ConfigPathError> {
        self.remote_root
            .clone()
            .map_or_else(|| default_app_path(REMOTE_DIR), Ok)
    }
}

/// Read `config.json`. A missing, unreadable or malformed file yields defaults.
pub fn load_app_config() -> AppConfig {
    match default_app_path(APP_CONFIG_FILE) {
        Ok(path) => load_app_config_from(&path),
        Err(err) => {
            tracing::debug!(?err, "no config directory; using defaults");
            AppConfig::default()
        }
    }
}

fn load_app_config_from(path: &Path) -> AppConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return AppConfig::default(),
        Err(err) => {
            tracing::warn!(?err, ?path, "config unreadable; using defaults");
            return AppConfig::default();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(?err, ?path, "config malformed; using defaults");
        AppConfig::default()
    })
}

fn default_app_path(file_name: &str) -> Result<PathBuf, ConfigPathError> {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    app_path(file_name, xdg_config_home.as_deref(), home.as_deref())
}

/// `<XDG_CONFIG_HOME or ~/.config>/campus-companion/<file_name>`.
fn app_path(
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let root = match xdg_config_home.filter(|dir| !dir.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => home
            .ok_or(ConfigPathError::MissingHomeDirectory)?
            .join(".config"),
    };
    Ok(root.join(APP_DIR).join(file_name))
}
