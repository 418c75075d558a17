//! Application configuration management.
//!
//! Settings are layered with figment:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config PATH`, or `config.toml` in the platform config dir)
//! 3. Environment variables prefixed `AO2VIS_` (`__` separates nested keys,
//!    e.g. `AO2VIS_README__SAMPLE_LINES=60`)
//!
//! ```toml
//! base_folders = ["C:/AO2/base", "D:/extra/base"]
//! io_threads = 4
//!
//! [readme]
//! sample_lines = 40
//! config_line_ratio = 0.5
//!
//! [preview_overrides]
//! Phoenix = 3
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::scanner::{ProjectionConfig, ReadmePolicy};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "AO2VIS_";

/// Errors raised while loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The layered configuration could not be extracted.
    #[error("Invalid configuration: {0}")]
    Extract(#[source] Box<figment::Error>),

    /// The settings could not be written as TOML.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The settings file could not be written.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// AO2 base folders in mount order.
    pub base_folders: Vec<PathBuf>,
    /// Where cache files live. Defaults to the platform cache directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Number of folders projected in parallel.
    pub io_threads: usize,
    /// Report rebuild progress every this many folders.
    pub progress_interval: usize,
    /// Readme detection tunables.
    pub readme: ReadmePolicy,
    /// Emote id to preview per character name.
    pub preview_overrides: BTreeMap<String, u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_folders: Vec::new(),
            cache_dir: None,
            io_threads: 4,
            progress_interval: 24,
            readme: ReadmePolicy::default(),
            preview_overrides: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Figment with all three layers; `config_path` replaces the default file.
    #[must_use]
    pub fn figment(config_path: Option<&Path>) -> Figment {
        Self::file_figment(config_path).merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn file_figment(config_path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match config_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path)
        {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        }
    }

    /// Load layered settings.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings: Self = Self::figment(config_path).extract()?;
        log::debug!(
            "Loaded settings with {} base folders",
            settings.base_folders.len()
        );
        Ok(settings)
    }

    /// Load defaults and file only, without environment overrides.
    ///
    /// Used before writing the file back so that environment values are not
    /// persisted.
    pub fn load_file_only(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::file_figment(config_path).extract()?)
    }

    /// Write the settings as TOML.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)
    }

    /// Default platform-specific settings file.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "ao2vis", "ao2vis")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Directory for cache files, or `None` to run memory-only.
    #[must_use]
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone().or_else(|| {
            ProjectDirs::from("com", "ao2vis", "ao2vis").map(|dirs| dirs.cache_dir().to_path_buf())
        })
    }

    /// Projection builder configuration derived from these settings.
    #[must_use]
    pub fn projection_config(&self) -> ProjectionConfig {
        ProjectionConfig::default()
            .with_io_threads(self.io_threads)
            .with_progress_interval(self.progress_interval)
            .with_readme_policy(self.readme.clone())
    }
}
