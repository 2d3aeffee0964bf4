//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, Windows registry, host probes and
//! external processes. This module is the only place where side effects occur.

pub mod dirs;
pub mod filesystem;
pub mod platform;
pub mod process;
pub mod registry;
pub mod toolchain;
