//! Host platform detection

use serde::Serialize;
use std::fmt;

/// Host operating system families with distinct install conventions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum HostPlatform {
    Windows,
    MacOs,
    Linux,
    /// Unknown/unsupported platform
    Other(String),
}

impl HostPlatform {
    /// Detect the current host platform
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }

    /// Executable file name for a tool on this platform
    ///
    /// Windows executables get `.exe` unless the name already has an
    /// extension (`espota.py` stays as is).
    pub fn program_name(&self, name: &str) -> String {
        if *self == Self::Windows && !name.contains('.') {
            format!("{name}.exe")
        } else {
            name.to_string()
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}
