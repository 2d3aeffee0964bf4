//! Target board resolution

use serde::Serialize;
use std::fmt;

use super::project::ProjectConfig;
use super::properties::Properties;
use crate::config::defaults::SUPPORTED_FAMILY;
use crate::error::{Result, UploadError};

/// Selected board: `package:architecture:board`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub package: String,
    pub architecture: String,
    pub board: String,
}

impl Target {
    /// Split a `package:architecture:board` string; missing parts are empty
    pub fn parse(triple: &str) -> Self {
        let mut parts = triple.split(':');
        let mut next = || parts.next().unwrap_or_default().to_string();
        Self {
            package: next(),
            architecture: next(),
            board: next(),
        }
    }

    /// Build from Arduino preference keys
    pub fn from_preferences(preferences: &Properties) -> Self {
        let field = |key: &str| preferences.get(key).unwrap_or_default().to_string();
        Self {
            package: field("target_package"),
            architecture: field("target_platform"),
            board: field("board"),
        }
    }

    /// Whether this target belongs to the supported board family
    pub fn is_supported(&self) -> bool {
        self.package == SUPPORTED_FAMILY && self.architecture == SUPPORTED_FAMILY
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.package, self.architecture, self.board)
    }
}

/// Resolve the target board
///
/// The project's `board` wins over the IDE preferences. Only ESP8266
/// targets are accepted.
pub fn resolve_target(project: &ProjectConfig, preferences: &Properties) -> Result<Target> {
    let target = match project.board.as_deref() {
        Some(board) => Target::parse(board),
        None => Target::from_preferences(preferences),
    };

    if !target.is_supported() {
        return Err(UploadError::UnsupportedTarget {
            package: target.package,
            architecture: target.architecture,
        });
    }

    tracing::debug!("Target: {target}");
    Ok(target)
}
