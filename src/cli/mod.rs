//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::core::report::Verbosity;
use crate::core::settings::{OutputSettings, PathSettings, Settings};
use crate::infra::dirs::AppDirs;
use commands::Commands;

/// Git commit the binary was built from, when known
pub const GIT_SHA: Option<&str> = option_env!("VERGEN_GIT_SHA");

fn long_version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| match GIT_SHA {
        Some(sha) => format!("{} ({sha})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// esp8266fs - Upload a data directory to ESP8266 SPIFFS
///
/// Packs the project's data directory with mkspiffs and flashes it with
/// esptool (serial) or espota.py (network), using the board selected in
/// the Arduino IDE.
#[derive(Parser, Debug)]
#[command(name = "esp8266fs")]
#[command(author, version, long_version = long_version(), about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for resolved paths, -vv for raw config)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory containing .vscode/arduino.json
    #[arg(long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    #[command(flatten)]
    pub paths: PathArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Location overrides; each beats the settings file
#[derive(Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// Arduino IDE installation directory
    #[arg(long, global = true, env = "ESP8266FS_ARDUINO_PATH", value_name = "DIR")]
    pub arduino: Option<PathBuf>,

    /// Arduino preferences directory (Arduino15)
    #[arg(long, global = true, env = "ESP8266FS_PREFERENCES_PATH", value_name = "DIR")]
    pub preferences: Option<PathBuf>,

    /// Data directory to pack
    #[arg(long, global = true, env = "ESP8266FS_DATA_FILES", value_name = "DIR")]
    pub data_files: Option<PathBuf>,

    /// Directory receiving spiffs.bin
    #[arg(long, global = true, env = "ESP8266FS_TEMP", value_name = "DIR")]
    pub temp: Option<PathBuf>,

    /// Python interpreter for network uploads
    #[arg(long, global = true, value_name = "PROGRAM")]
    pub python: Option<String>,

    /// Run log level: silent, normal, verbose or debug
    #[arg(long, global = true, env = "ESP8266FS_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<Verbosity>,
}

impl PathArgs {
    fn into_settings(self) -> Settings {
        Settings {
            paths: PathSettings {
                arduino: self.arduino,
                preferences: self.preferences,
                data_files: self.data_files,
                temp: self.temp,
                python: self.python,
            },
            output: OutputSettings {
                log_level: self.log_level,
            },
        }
    }
}

/// Resolved context shared by every command
#[derive(Debug, Clone)]
pub struct RunContext {
    pub project_root: PathBuf,
    pub settings: Settings,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let project_root = match self.project {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read current directory")?,
        };

        let dirs = AppDirs::new();
        let settings = Settings::load(&dirs)?.with_overrides(self.paths.into_settings());
        tracing::debug!(config = %dirs.settings_path().display(), ?settings, "settings loaded");

        let context = RunContext {
            project_root,
            settings,
        };
        self.command.unwrap_or_default().run(context).await
    }
}
