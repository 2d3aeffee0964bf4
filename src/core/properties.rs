//! Line-oriented `key=value` files
//!
//! Both `preferences.txt` and `boards.txt` use this format: one entry per
//! line, `#` comments, no quoting, no escaping, no continuation lines.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, UploadError};

/// Flat string mapping parsed from a `key=value` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` text
    ///
    /// Blank lines and lines starting with `#` are skipped. Each other line
    /// is split on its first `=`; a line without `=` maps to an empty value.
    /// Duplicate keys keep the last value.
    pub fn parse(text: &str) -> Self {
        let mut props = Self::new();
        for line in lines(text) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            props.insert(key, value);
        }
        props
    }

    /// Read and parse a `key=value` file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| UploadError::config(path, e))?;
        tracing::debug!("Read {} entries from {}", text.lines().count(), path.display());
        Ok(Self::parse(&text))
    }

    /// Render back to `key=value` lines
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a value, treating empty strings as absent
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

/// Split text on `\r\n`, `\r` or `\n`
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\r', '\n'])
}
