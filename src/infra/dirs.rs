//! Platform-specific directory management
//!
//! Provides the esp8266fs config directory and the default location of the
//! Arduino IDE preferences directory (`Arduino15`).
//!
//! Environment variables can override default directories:
//! - `ESP8266FS_CONFIG_DIR` - Override config directory

use std::env;
use std::path::PathBuf;

use super::platform::HostPlatform;

/// Environment variable name for the config directory override
pub const ENV_CONFIG_DIR: &str = "ESP8266FS_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "esp8266fs";

/// Platform-specific directory provider for esp8266fs
#[derive(Debug, Clone)]
pub struct AppDirs {
    config_dir: PathBuf,
}

impl AppDirs {
    /// Create a new `AppDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use a fixed config directory
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/esp8266fs` or `~/.config/esp8266fs`
    /// - macOS: `~/Library/Application Support/esp8266fs`
    /// - Windows: `%APPDATA%\esp8266fs`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the settings file path
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(crate::config::files::SETTINGS_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for AppDirs {
    fn default() -> Self {
        Self::new()
    }
}

/// Default Arduino preferences directory for a platform
///
/// - Windows: `%LOCALAPPDATA%\Arduino15`
/// - Linux: `~/.arduino15`
/// - macOS: `~/Library/Arduino15`
pub fn default_preferences_dir(platform: &HostPlatform) -> Option<PathBuf> {
    match platform {
        HostPlatform::Windows => dirs::data_local_dir().map(|p| p.join("Arduino15")),
        HostPlatform::Linux => dirs::home_dir().map(|h| h.join(".arduino15")),
        HostPlatform::MacOs => dirs::home_dir().map(|h| h.join("Library").join("Arduino15")),
        HostPlatform::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_new_creates_instance() {
        let dirs = AppDirs::new();
        assert!(!dirs.config_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_settings_path_is_under_config_dir() {
        let dirs = AppDirs::with_config_dir(PathBuf::from("/etc/esp8266fs"));
        assert_eq!(dirs.settings_path(), PathBuf::from("/etc/esp8266fs/config.toml"));
    }

    #[test]
    fn test_default_preferences_dir_names() {
        if let Some(dir) = default_preferences_dir(&HostPlatform::Linux) {
            assert!(dir.ends_with(".arduino15"));
        }
        if let Some(dir) = default_preferences_dir(&HostPlatform::MacOs) {
            assert!(dir.ends_with("Library/Arduino15"));
        }
        assert_eq!(
            default_preferences_dir(&HostPlatform::Other("haiku".to_string())),
            None
        );
    }
}
