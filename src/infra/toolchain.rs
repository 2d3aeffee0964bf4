//! Arduino IDE installation discovery
//!
//! The IDE is found through an ordered list of probes per host platform.
//! The first probe that yields an existing directory wins.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::filesystem::dir_exists;
use super::platform::HostPlatform;
use super::registry::{self, HKLM};
use crate::config::files::{ARDUINO_APP_BUNDLE, ARDUINO_EXECUTABLE};
use crate::error::{Result, UploadError};

const ARDUINO_X32_REG_KEY: &str = "\\SOFTWARE\\Arduino";
const ARDUINO_X64_REG_KEY: &str = "\\SOFTWARE\\WOW6432Node\\Arduino";
const INSTALL_DIR_VALUE: &str = "Install_Dir";

/// One way of finding the IDE installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Windows registry value naming the install directory
    Registry { key: &'static str, value: &'static str },
    /// Executable on PATH; the install directory is its parent
    PathExecutable {
        name: &'static str,
        follow_symlinks: bool,
    },
    /// macOS application bundle inside an Applications directory
    AppBundle { applications: PathBuf },
}

impl Probe {
    /// Run the probe; `None` when it finds no existing directory
    pub fn run(&self) -> Option<PathBuf> {
        let found = match self {
            Self::Registry { key, value } => {
                registry::query_value(HKLM, key, value).map(PathBuf::from)
            }
            Self::PathExecutable {
                name,
                follow_symlinks,
            } => {
                let cwd = env::current_dir().ok()?;
                executable_dir(name, env::var_os("PATH"), &cwd, *follow_symlinks)
            }
            Self::AppBundle { applications } => Some(applications.join(ARDUINO_APP_BUNDLE)),
        };

        found.filter(|dir| dir_exists(dir))
    }
}

/// Directory of `name` found on a `PATH`-style search list
///
/// With `follow_symlinks` the executable is canonicalised first, so a
/// `/usr/local/bin/arduino` link yields the real install directory.
fn executable_dir(
    name: &str,
    search: Option<OsString>,
    cwd: &Path,
    follow_symlinks: bool,
) -> Option<PathBuf> {
    let exe = which::which_in(name, search, cwd).ok()?;
    let exe = if follow_symlinks {
        exe.canonicalize().ok()?
    } else {
        exe
    };
    exe.parent().map(Path::to_path_buf)
}

/// Registry key holding the install directory for this process
fn registry_key() -> &'static str {
    registry_key_for(
        cfg!(target_pointer_width = "64"),
        env::var_os("PROCESSOR_ARCHITEW6432").is_some(),
    )
}

/// A 64-bit process, or a 32-bit one under WOW64, reads the redirected key
fn registry_key_for(pointer_64: bool, wow64: bool) -> &'static str {
    if pointer_64 || wow64 {
        ARDUINO_X64_REG_KEY
    } else {
        ARDUINO_X32_REG_KEY
    }
}

/// Ordered probes for a host platform
pub fn probes_for(platform: &HostPlatform) -> Vec<Probe> {
    match platform {
        HostPlatform::Windows => vec![
            Probe::Registry {
                key: registry_key(),
                value: INSTALL_DIR_VALUE,
            },
            Probe::PathExecutable {
                name: ARDUINO_EXECUTABLE,
                follow_symlinks: false,
            },
        ],
        HostPlatform::MacOs => dirs::home_dir()
            .map(|home| home.join("Applications"))
            .into_iter()
            .chain(std::iter::once(PathBuf::from("/Applications")))
            .map(|applications| Probe::AppBundle { applications })
            .collect(),
        HostPlatform::Linux => vec![Probe::PathExecutable {
            name: ARDUINO_EXECUTABLE,
            follow_symlinks: true,
        }],
        HostPlatform::Other(_) => Vec::new(),
    }
}

/// Locate the Arduino IDE installation
///
/// An explicitly configured path is used as is and must exist. Otherwise
/// the platform probes are tried in order.
pub fn resolve_install_path(explicit: Option<&Path>, platform: &HostPlatform) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !dir_exists(path) {
            return Err(UploadError::not_found("Arduino path", path));
        }
        return Ok(path.to_path_buf());
    }

    let found = first_match(&probes_for(platform));
    if found.is_none() {
        tracing::warn!("No Arduino installation found on {platform}");
    }
    found.ok_or_else(|| UploadError::not_found("Arduino installation", ARDUINO_EXECUTABLE))
}

/// Run probes in order, stopping at the first hit
pub fn first_match(probes: &[Probe]) -> Option<PathBuf> {
    probes.iter().find_map(|probe| {
        let found = probe.run();
        tracing::debug!(?probe, ?found, "install probe");
        found
    })
}
