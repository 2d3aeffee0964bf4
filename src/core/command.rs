//! External command lines for packing and uploading
//!
//! Only argument assembly lives here; running the commands is
//! [`crate::infra::process`]'s job.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use super::memory::{parse_int, FlashParameters, SpiffsLayout, RESET_METHOD, UPLOAD_SPEED};
use crate::error::{Result, UploadError};

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Arguments as lossy strings, for display and assertions
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    if s.contains(' ') {
        format!("\"{s}\"")
    } else {
        s.to_string()
    }
}

/// `mkspiffs -c <data> -p <page> -b <block> -s <size> <image>`
pub fn pack_command(
    mkspiffs: &Path,
    data_dir: &Path,
    layout: &SpiffsLayout,
    image: &Path,
) -> CommandLine {
    CommandLine::new(mkspiffs)
        .arg("-c")
        .arg(data_dir)
        .arg("-p")
        .arg(layout.page_size.to_string())
        .arg("-b")
        .arg(layout.block_size.to_string())
        .arg("-s")
        .arg(layout.size().to_string())
        .arg(image)
}

fn required<'a>(params: &'a FlashParameters, param: &str) -> Result<&'a str> {
    params
        .get(param)
        .ok_or_else(|| UploadError::MissingParameter {
            param: param.to_string(),
            board: String::new(),
            memory_config: String::new(),
        })
}

/// `esptool -ca <offset> -cd <reset> -cp <port> -cb <speed> -cf <image>`
pub fn serial_upload_command(
    esptool: &Path,
    params: &FlashParameters,
    layout: &SpiffsLayout,
    port: &str,
    image: &Path,
) -> Result<CommandLine> {
    let reset_method = required(params, RESET_METHOD)?;
    let speed = parse_int(UPLOAD_SPEED, required(params, UPLOAD_SPEED)?)?;

    Ok(CommandLine::new(esptool)
        .arg("-ca")
        .arg(format!("0x{:06X}", layout.start))
        .arg("-cd")
        .arg(reset_method)
        .arg("-cp")
        .arg(port)
        .arg("-cb")
        .arg(speed.to_string())
        .arg("-cf")
        .arg(image))
}

/// `python espota.py -i <ip> -s -f <image>`
pub fn ota_upload_command(python: &Path, espota: &Path, ip: &str, image: &Path) -> CommandLine {
    CommandLine::new(python)
        .arg(espota)
        .arg("-i")
        .arg(ip)
        .arg("-s")
        .arg("-f")
        .arg(image)
}
