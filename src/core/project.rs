//! Project configuration (`.vscode/arduino.json`)
//!
//! The file is written by the Arduino editor extension. Besides top-level
//! fields it may carry a `configuration` string such as
//! `"xtal=80,FlashSize=4M1M,UploadSpeed=115200"` whose pairs are merged into
//! the top level, overriding fields of the same name.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::config::files::PROJECT_CONFIG_FILE;
use crate::error::{Result, UploadError};

/// Fields of `arduino.json` this tool consumes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Board triple `package:architecture:board`
    #[serde(default, deserialize_with = "lenient_string")]
    pub board: Option<String>,

    /// FlashSize menu variant override
    #[serde(rename = "FlashSize", default, deserialize_with = "lenient_string")]
    pub flash_size: Option<String>,

    /// Data directory override
    #[serde(rename = "esp8266dataFiles", default, deserialize_with = "lenient_string")]
    pub data_files: Option<String>,

    /// Temp directory override
    #[serde(rename = "esp8266temp", default, deserialize_with = "lenient_string")]
    pub temp: Option<String>,

    /// Serial port or device IP
    #[serde(default, deserialize_with = "lenient_string")]
    pub port: Option<String>,

    /// Upload speed override
    #[serde(rename = "UploadSpeed", default, deserialize_with = "lenient_string")]
    pub upload_speed: Option<String>,

    /// Reset method override
    #[serde(rename = "ResetMethod", default, deserialize_with = "lenient_string")]
    pub reset_method: Option<String>,
}

impl ProjectConfig {
    /// Path of the project configuration file under a project root
    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_CONFIG_FILE)
    }

    /// Load the project configuration from a project root
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = Self::path_in(project_root);
        let content =
            std::fs::read_to_string(&path).map_err(|e| UploadError::config(&path, e))?;
        Self::from_json(&content).map_err(|e| UploadError::config(&path, e))
    }

    /// Parse JSON text, expanding the embedded `configuration` string
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let mut map: Map<String, Value> = serde_json::from_str(content)?;

        if let Some(Value::String(configuration)) = map.get("configuration").cloned() {
            for (key, value) in split_configuration(&configuration) {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
        }

        serde_json::from_value(Value::Object(map))
    }
}

/// Split `a=1,b=2` into pairs; entries without `=` are ignored
fn split_configuration(configuration: &str) -> impl Iterator<Item = (&str, &str)> {
    configuration
        .split(',')
        .filter_map(|entry| entry.trim().split_once('='))
        .filter(|(key, _)| !key.is_empty())
}

/// Accept strings and numbers; treat empty strings and null as absent
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
