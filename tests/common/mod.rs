//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Preferences selecting a NodeMCU 1.0 with a 4M/1M flash layout on a USB serial port
pub const SAMPLE_PREFERENCES: &str = "\
board=nodemcuv2
custom_FlashSize=nodemcuv2_4M1M
serial.port=/dev/ttyUSB0
target_package=esp8266
target_platform=esp8266
";

/// Excerpt of the ESP8266 core's boards.txt
pub const SAMPLE_BOARDS: &str = "\
nodemcuv2.name=NodeMCU 1.0 (ESP-12E Module)
nodemcuv2.upload.tool=esptool
nodemcuv2.upload.speed=115200
nodemcuv2.upload.resetmethod=nodemcu
nodemcuv2.menu.FlashSize.4M1M=4M (1M SPIFFS)
nodemcuv2.menu.FlashSize.4M1M.build.flash_size=4M
nodemcuv2.menu.FlashSize.4M1M.build.spiffs_start=0x300000
nodemcuv2.menu.FlashSize.4M1M.build.spiffs_end=0x3FB000
nodemcuv2.menu.FlashSize.4M1M.build.spiffs_pagesize=256
nodemcuv2.menu.FlashSize.4M1M.build.spiffs_blocksize=8192
nodemcuv2.menu.FlashSize.4M3M=4M (3M SPIFFS)
nodemcuv2.menu.FlashSize.4M3M.build.spiffs_start=0x100000
nodemcuv2.menu.FlashSize.4M3M.build.spiffs_end=0x3FB000
";

pub const CORE_VERSION: &str = "2.5.0";
pub const MKSPIFFS_VERSION: &str = "2.5.0-4-b40a1b0";
pub const ESPTOOL_VERSION: &str = "0.4.13";
pub const ESPOTA_VERSION: &str = "2.5.0";

/// Test project context
///
/// Lays out an Arduino installation, an `Arduino15` preferences directory
/// with the ESP8266 core, and a sketch project, all in one temporary
/// directory.
pub struct TestProject {
    /// Temporary directory holding every fixture
    pub dir: TempDir,
}

impl TestProject {
    /// Create an empty fixture root
    pub fn new() -> Self {
        let project = Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        };
        // `command()` runs inside the sketch directory
        project.create_dir("sketch");
        project
    }

    /// Create a complete ESP8266 setup with placeholder tools
    pub fn esp8266() -> Self {
        let project = Self::new();
        project.create_file("arduino/arduino", "");
        project.create_file("Arduino15/preferences.txt", SAMPLE_PREFERENCES);
        project.create_file(
            &format!("Arduino15/packages/esp8266/hardware/esp8266/{CORE_VERSION}/boards.txt"),
            SAMPLE_BOARDS,
        );
        project.create_file(&project.tool_rel("mkspiffs", MKSPIFFS_VERSION), "");
        project.create_file(&project.tool_rel("esptool", ESPTOOL_VERSION), "");
        project.create_file(&project.tool_rel("espota.py", ESPOTA_VERSION), "");
        project.create_file("sketch/.vscode/arduino.json", r#"{ "sketch": "Blink.ino" }"#);
        project.create_file("sketch/data/index.html", "<h1>esp8266fs</h1>\n");
        project.create_dir("tmp");
        project.create_dir("config");
        project
    }

    /// Get the path to the fixture root
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Path of the sketch project
    pub fn sketch(&self) -> PathBuf {
        self.dir.path().join("sketch")
    }

    /// Path of the packed image
    pub fn image(&self) -> PathBuf {
        self.dir.path().join("tmp").join("spiffs.bin")
    }

    fn tool_rel(&self, tool: &str, version: &str) -> String {
        format!("Arduino15/packages/esp8266/tools/{tool}/{version}/{tool}")
    }

    /// Create a file relative to the fixture root
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory relative to the fixture root
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists relative to the fixture root
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file relative to the fixture root
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write the sketch's `.vscode/arduino.json`
    pub fn set_project_config(&self, json: &str) {
        self.create_file("sketch/.vscode/arduino.json", json);
    }

    /// Replace a tool with a shell script that logs its arguments to
    /// `<tool>.args` in the fixture root
    #[cfg(unix)]
    pub fn install_script(&self, tool: &str, version: &str, extra: &str) {
        use std::os::unix::fs::PermissionsExt;

        let log = self.dir.path().join(format!("{tool}.args"));
        let path = self.dir.path().join(self.tool_rel(tool, version));
        let script = format!(
            "#!/bin/sh\necho \"$@\" > '{}'\n{extra}\n",
            log.display()
        );
        std::fs::write(&path, script).expect("Failed to write tool script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make tool script executable");
    }

    /// Arguments a scripted tool was last called with
    pub fn tool_args(&self, tool: &str) -> String {
        self.read_file(&format!("{tool}.args")).trim().to_string()
    }

    /// Command for the esp8266fs binary, isolated from the host setup
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_esp8266fs"));
        cmd.current_dir(self.sketch())
            .env("ESP8266FS_CONFIG_DIR", self.dir.path().join("config"))
            .env("ESP8266FS_ARDUINO_PATH", self.dir.path().join("arduino"))
            .env("ESP8266FS_PREFERENCES_PATH", self.dir.path().join("Arduino15"))
            .env("ESP8266FS_TEMP", self.dir.path().join("tmp"))
            .env_remove("ESP8266FS_DATA_FILES")
            .env_remove("ESP8266FS_LOG_LEVEL")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run esp8266fs with arguments
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute esp8266fs")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
