//! Run log
//!
//! Every line a run produces goes through a [`LogSink`]. The CLI installs a
//! console sink; tests use [`MemorySink`] to assert on what was reported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// Category of a run log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Run started / finished banners
    Announce,
    /// Stage headers such as "Packing SPIFFS file"
    Stage,
    /// Notable facts: versions found, images created
    Important,
    /// Indented `[SPIFFS]` parameter lines
    Detail,
    /// Standard output of an external tool
    Output,
    /// Errors and standard error of an external tool
    Urgent,
    /// Resolved paths and values
    Verbose,
    /// Raw configuration dumps
    Debug,
}

/// How much of the run log is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Silent,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    /// Whether a line of the given kind is shown at this level
    pub fn shows(self, kind: LogKind) -> bool {
        match kind {
            LogKind::Verbose => self >= Self::Verbose,
            LogKind::Debug => self >= Self::Debug,
            _ => self >= Self::Normal,
        }
    }

    /// Raise the level by `-v` occurrences
    #[must_use]
    pub fn raised(self, count: u8) -> Self {
        match (self, count) {
            (level, 0) => level,
            (Self::Silent | Self::Normal, 1) => Self::Verbose,
            _ => Self::Debug,
        }
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            other => Err(format!(
                "unknown log level '{other}' (expected silent, normal, verbose or debug)"
            )),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Silent => "silent",
            Self::Normal => "normal",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Destination for run log lines
pub trait LogSink: Send + Sync {
    fn log(&self, kind: LogKind, message: &str);

    fn announce(&self, message: &str) {
        self.log(LogKind::Announce, message);
    }

    fn stage(&self, message: &str) {
        self.log(LogKind::Stage, message);
    }

    fn important(&self, message: &str) {
        self.log(LogKind::Important, message);
    }

    fn detail(&self, message: &str) {
        self.log(LogKind::Detail, message);
    }

    fn urgent(&self, message: &str) {
        self.log(LogKind::Urgent, message);
    }

    fn verbose(&self, message: &str) {
        self.log(LogKind::Verbose, message);
    }

    fn debug(&self, message: &str) {
        self.log(LogKind::Debug, message);
    }
}

/// Sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(LogKind, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines logged so far
    pub fn lines(&self) -> Vec<(LogKind, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Messages of a single kind
    pub fn messages(&self, kind: LogKind) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m)
            .collect()
    }

    /// Whether any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, m)| m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, kind: LogKind, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((kind, message.to_string()));
        }
    }
}
