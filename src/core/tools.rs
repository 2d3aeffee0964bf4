//! Board package and tool lookup
//!
//! The Arduino Board Manager installs packages as
//! `<preferences>/packages/<package>/hardware/<arch>/<version>/` and tools
//! as `<preferences>/packages/<package>/tools/<tool>/<version>/<tool>`.
//! Exactly one installed version is accepted, never a guess between several.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::target::Target;
use crate::config::files::BOARDS_FILE;
use crate::error::{Result, UploadError};
use crate::infra::filesystem::{require_dir, require_file, subdirectories};
use crate::infra::platform::HostPlatform;

/// A located, versioned install directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub version: String,
    pub path: PathBuf,
}

/// Pick the only version directory under `dir`
fn single_version(name: &str, dir: &Path) -> Result<Installed> {
    let versions = subdirectories(dir)?;
    match versions.as_slice() {
        [version] => Ok(Installed {
            version: version.clone(),
            path: dir.join(version),
        }),
        _ => Err(UploadError::AmbiguousVersion {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            found: versions.len(),
            versions,
        }),
    }
}

/// Locate the installed board package for the target
pub fn board_package(preferences_dir: &Path, target: &Target) -> Result<Installed> {
    let dir = preferences_dir
        .join("packages")
        .join(&target.package)
        .join("hardware")
        .join(&target.architecture);

    require_dir("ESP8266 board package", &dir)?;
    let package = single_version(&format!("{} board package", target.package), &dir)?;
    tracing::debug!("ESP8266 board package: {}", package.version);
    Ok(package)
}

/// Path of `boards.txt` inside an installed board package
pub fn boards_file(package: &Installed) -> Result<PathBuf> {
    let path = package.path.join(BOARDS_FILE);
    require_file("Board definitions", &path)?;
    Ok(path)
}

/// Locate the tools root for the target's package
pub fn tools_path(preferences_dir: &Path, target: &Target) -> Result<PathBuf> {
    let dir = preferences_dir
        .join("packages")
        .join(&target.package)
        .join("tools");

    require_dir("ESP8266 tools path", &dir)?;
    tracing::debug!("Tools path: {}", dir.display());
    Ok(dir)
}

/// A located tool executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tool {
    pub name: String,
    pub version: String,
    pub program: PathBuf,
}

/// Locate `<tools>/<tool>/<version>/<program>`
pub fn locate_tool(tools_root: &Path, tool: &str, platform: &HostPlatform) -> Result<Tool> {
    let dir = tools_root.join(tool);
    require_dir(&format!("{tool} tool directory"), &dir)?;

    let installed = single_version(tool, &dir)?;
    let program = installed.path.join(platform.program_name(tool));
    require_file(tool, &program)?;

    tracing::debug!("{tool}: {}", program.display());
    Ok(Tool {
        name: tool.to_string(),
        version: installed.version,
        program,
    })
}
