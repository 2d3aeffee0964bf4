//! Core upload logic
//!
//! Configuration readers, resolvers and the session that sequences them.
//! Filesystem and process access go through [`crate::infra`].
//!
//! # Submodules
//!
//! - [`properties`] - `key=value` text files (preferences, boards)
//! - [`project`] - `.vscode/arduino.json`
//! - [`target`] - Selected board and family check
//! - [`memory`] - FlashSize variant and SPIFFS layout
//! - [`tools`] - Board package and tool versions
//! - [`transport`] - Serial vs. network upload
//! - [`command`] - External command lines
//! - [`report`] - Run log kinds, levels and sinks
//! - [`settings`] - Host settings file
//! - [`session`] - Single-flight orchestration

pub mod command;
pub mod memory;
pub mod project;
pub mod properties;
pub mod report;
pub mod session;
pub mod settings;
pub mod target;
pub mod tools;
pub mod transport;
