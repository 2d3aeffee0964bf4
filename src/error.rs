//! Error types for esp8266fs
//!
//! Domain-specific error types using thiserror. Every variant carries the
//! path, key or program it refers to so the message alone is enough to act on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or running a SPIFFS upload
#[derive(Error, Debug)]
pub enum UploadError {
    /// A required file, directory or executable does not exist
    #[error("{what} not found: {path}")]
    NotFound { what: String, path: PathBuf },

    /// A value required to locate something was never configured
    #[error("Can't determine {what}: {hint}")]
    NotConfigured { what: String, hint: String },

    /// Zero or several installed versions where exactly one is required
    #[error(
        "Expected exactly one installed version of {name} in '{dir}', found {found}: {}",
        list_or_none(.versions)
    )]
    AmbiguousVersion {
        name: String,
        dir: PathBuf,
        found: usize,
        versions: Vec<String>,
    },

    /// Selected board does not belong to the supported family
    #[error("Current Arduino package/architecture is '{package}:{architecture}', not ESP8266")]
    UnsupportedTarget {
        package: String,
        architecture: String,
    },

    /// Flash size variant could not be derived for the board
    #[error("Can't determine Flash Size for board '{board}' (set FlashSize or custom_FlashSize)")]
    AmbiguousFlashSize { board: String },

    /// Required flash parameter missing after scanning board definitions
    #[error("Missing \"{param}\" definition: board = {board}, config = {memory_config}")]
    MissingParameter {
        param: String,
        board: String,
        memory_config: String,
    },

    /// Flash parameter present but unusable
    #[error("Invalid value '{value}' for \"{param}\": {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    /// External command could not be started
    #[error("Failed to run {program}: {error}")]
    ProcessSpawn { program: PathBuf, error: String },

    /// External command exited unsuccessfully
    #[error("{program} returned {}", exit_code(.code))]
    ProcessFailure { program: PathBuf, code: Option<i32> },

    /// A run is already in progress on this session
    #[error("ESP8266FS already running")]
    AlreadyRunning,

    /// Configuration file could not be read or parsed
    #[error("Failed to load '{path}': {error}")]
    Config { path: PathBuf, error: String },
}

impl UploadError {
    /// Shorthand for [`UploadError::NotFound`]
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Shorthand for [`UploadError::Config`]
    pub fn config(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::Config {
            path: path.into(),
            error: error.to_string(),
        }
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "no exit code".to_string(), |c| c.to_string())
}

/// Result alias used throughout the crate
pub type Result<T, E = UploadError> = std::result::Result<T, E>;
