//! Windows registry lookups
//!
//! Values are read through the stock `reg query` command rather than the
//! Win32 API, so the parser below is plain text handling and can be tested
//! on every host.

use regex::Regex;
use std::process::Command;

/// Hive used for machine-wide installs
pub const HKLM: &str = "HKLM";

/// Read a registry value, `None` when the key or value does not exist
pub fn query_value(hive: &str, key: &str, name: &str) -> Option<String> {
    let full_key = format!("{hive}{key}");
    tracing::debug!("Querying registry {full_key} /v {name}");

    let output = Command::new("reg")
        .args(["query", &full_key, "/v", name])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    parse_query_output(&String::from_utf8_lossy(&output.stdout), name)
}

/// Extract a value from `reg query` output
///
/// ```text
/// HKEY_LOCAL_MACHINE\SOFTWARE\WOW6432Node\Arduino
///     Install_Dir    REG_SZ    C:\Program Files (x86)\Arduino
/// ```
pub fn parse_query_output(output: &str, name: &str) -> Option<String> {
    let pattern = format!(r"^\s*{}\s+REG_\w+\s+(.*?)\s*$", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;

    output
        .lines()
        .find_map(|line| re.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|value| !value.is_empty())
}
