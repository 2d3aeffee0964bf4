//! Host settings
//!
//! Reads `config.toml` from the esp8266fs config directory. Every value is
//! optional; command-line flags and environment variables override the file
//! through [`Settings::with_overrides`].
//!
//! ```toml
//! [paths]
//! arduino = "/opt/arduino-1.8.19"
//! preferences = "/home/me/.arduino15"
//! python = "python3"
//!
//! [output]
//! log_level = "verbose"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::report::Verbosity;
use crate::config::defaults::DEFAULT_PYTHON;
use crate::error::{Result, UploadError};
use crate::infra::dirs::AppDirs;

/// Settings for esp8266fs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Location overrides
    #[serde(default)]
    pub paths: PathSettings,

    /// Output preferences
    #[serde(default)]
    pub output: OutputSettings,
}

/// Location overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Arduino IDE installation directory
    pub arduino: Option<PathBuf>,

    /// Arduino preferences directory (`Arduino15`)
    pub preferences: Option<PathBuf>,

    /// Data directory to pack
    pub data_files: Option<PathBuf>,

    /// Directory receiving the packed image
    pub temp: Option<PathBuf>,

    /// Python interpreter for OTA uploads
    pub python: Option<String>,
}

/// Output preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Run log verbosity
    pub log_level: Option<Verbosity>,
}

impl Settings {
    /// Load settings from the config directory
    ///
    /// A missing file yields defaults; an invalid one is an error.
    pub fn load(dirs: &AppDirs) -> Result<Self> {
        Self::load_from_path(&dirs.settings_path())
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| UploadError::config(path, e))?;
        toml::from_str(&content).map_err(|e| UploadError::config(path, e))
    }

    /// Apply overrides; `Some` values replace file values
    #[must_use]
    pub fn with_overrides(mut self, overrides: Settings) -> Self {
        let paths = overrides.paths;
        self.paths.arduino = paths.arduino.or(self.paths.arduino);
        self.paths.preferences = paths.preferences.or(self.paths.preferences);
        self.paths.data_files = paths.data_files.or(self.paths.data_files);
        self.paths.temp = paths.temp.or(self.paths.temp);
        self.paths.python = paths.python.or(self.paths.python);
        self.output.log_level = overrides.output.log_level.or(self.output.log_level);
        self
    }

    /// Effective log level
    #[must_use]
    pub fn log_level(&self) -> Verbosity {
        self.output.log_level.unwrap_or_default()
    }

    /// Effective Python interpreter
    #[must_use]
    pub fn python(&self) -> &str {
        self.paths.python.as_deref().unwrap_or(DEFAULT_PYTHON)
    }
}
