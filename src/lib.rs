//! esp8266fs - ESP8266 SPIFFS uploader
//!
//! Locates the Arduino IDE, its preferences and the installed ESP8266 board
//! package, derives the selected board's SPIFFS layout, then packs a data
//! directory with `mkspiffs` and uploads it with `esptool` or `espota.py`.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Resolution logic and the upload session
//! - [`infra`] - Infrastructure layer (filesystem, processes, host probes)
//! - [`config`] - Constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
