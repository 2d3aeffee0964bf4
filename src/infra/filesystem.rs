//! Filesystem operations
//!
//! Handles file and directory lookups.

use std::path::Path;
use walkdir::WalkDir;

use crate::error::{Result, UploadError};

/// Whether `path` exists and is a directory
pub fn dir_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Whether `path` exists and is a regular file
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Require an existing directory
pub fn require_dir(what: &str, path: &Path) -> Result<()> {
    if dir_exists(path) {
        Ok(())
    } else {
        Err(UploadError::not_found(what, path))
    }
}

/// Require an existing file
pub fn require_file(what: &str, path: &Path) -> Result<()> {
    if file_exists(path) {
        Ok(())
    } else {
        Err(UploadError::not_found(what, path))
    }
}

/// Names of the immediate subdirectories of `path`, sorted
pub fn subdirectories(path: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(path).map_err(|e| UploadError::config(path, e))?;

    let mut names: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    Ok(names)
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| UploadError::config(path, e))
}

/// File count and total size of a directory tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirStats {
    pub files: u64,
    pub bytes: u64,
}

/// Walk a directory tree and sum up its regular files
pub fn dir_stats(path: &Path) -> DirStats {
    WalkDir::new(path)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .fold(DirStats::default(), |acc, meta| DirStats {
            files: acc.files + 1,
            bytes: acc.bytes + meta.len(),
        })
}
