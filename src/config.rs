// Configuration module for cinelib
// JSON config file plus environment overrides for file locations

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::EntryKind;

const APP_NAME: &str = "cinelib";
const CONFIG_FILENAME: &str = "config.json";

/// UI color theme. Unknown names in the config fall back to `Dark`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Netflix,
    Fun,
}

impl From<String> for Theme {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Light" => Theme::Light,
            "Netflix" => Theme::Netflix,
            "Fun" => Theme::Fun,
            _ => Theme::Dark,
        }
    }
}

/// Library listing filter. Unknown names fall back to `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum TypeFilter {
    #[default]
    All,
    Movies,
    Series,
}

impl From<String> for TypeFilter {
    fn from(name: String) -> Self {
        match name.trim() {
            "Movies" => TypeFilter::Movies,
            "Series" => TypeFilter::Series,
            _ => TypeFilter::All,
        }
    }
}

impl TypeFilter {
    pub fn matches(&self, kind: EntryKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Movies => kind == EntryKind::Movie,
            TypeFilter::Series => kind == EntryKind::Series,
        }
    }
}

/// The `config.json` contents.
///
/// `positions` maps file paths to last-watched offsets in milliseconds;
/// together with `last_watched` it is the persistence surface the external
/// player uses for resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tmdb_api_key: String,
    pub folders: Vec<PathBuf>,
    pub last_dir: Option<PathBuf>,
    pub theme: Theme,
    pub last_type: TypeFilter,
    pub positions: HashMap<String, u64>,
    pub last_watched: Option<String>,
}

impl Config {
    /// Load the configuration.
    ///
    /// A missing or unparseable file degrades to defaults; the only fatal
    /// condition is an absent `tmdb_api_key`, which aborts startup.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        };

        if config.tmdb_api_key.trim().is_empty() {
            bail!("TMDb API key not found in {}", path.display());
        }

        Ok(config)
    }

    /// Write the whole configuration back, pretty-printed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Folders to scan: the configured list, falling back to `last_dir`
    /// and finally the home directory.
    pub fn scan_folders(&self) -> Vec<PathBuf> {
        if !self.folders.is_empty() {
            return self.folders.clone();
        }
        let fallback = self
            .last_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        vec![fallback]
    }

    /// Last-watched offset for a file, in milliseconds.
    pub fn position_for(&self, path: &Path) -> Option<u64> {
        self.positions.get(&path.to_string_lossy().into_owned()).copied()
    }

    /// Record the last-watched offset for a file, in milliseconds.
    pub fn set_position(&mut self, path: &Path, millis: u64) {
        self.positions
            .insert(path.to_string_lossy().into_owned(), millis);
    }

    pub fn set_last_watched(&mut self, path: &Path) {
        self.last_watched = Some(path.to_string_lossy().into_owned());
    }
}

/// Path of the config file: `CINELIB_CONFIG` env override, else
/// `config.json` in the working directory.
pub fn config_file_path() -> PathBuf {
    if let Ok(path) = std::env::var("CINELIB_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(CONFIG_FILENAME)
}

/// Cache root resolution, in priority order:
/// 1. `CINELIB_CACHE_DIR` environment variable
/// 2. platform cache directory (e.g. `~/.cache/cinelib`)
/// 3. `.cache` in the working directory
pub fn cache_root() -> PathBuf {
    if let Ok(path) = std::env::var("CINELIB_CACHE_DIR") {
        return PathBuf::from(path);
    }
    if let Some(dir) = dirs::cache_dir() {
        return dir.join(APP_NAME);
    }
    PathBuf::from(".cache")
}
