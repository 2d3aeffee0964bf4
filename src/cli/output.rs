//! Output formatting and progress indicators
//!
//! Global output modes (`--quiet`, `--json`, `-v`), status helpers, and the
//! console sink that renders the run log.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

use crate::core::report::{LogKind, LogSink, Verbosity};

static QUIET: AtomicBool = AtomicBool::new(false);
static JSON: AtomicBool = AtomicBool::new(false);
static VERBOSE: AtomicU8 = AtomicU8::new(0);

/// Output mode selected on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Configuration last applied with [`OutputConfig::apply_global`]
    pub fn current() -> Self {
        Self::new(is_quiet(), is_json(), verbose_level())
    }

    /// Make this configuration visible to the output helpers
    pub fn apply_global(&self) {
        QUIET.store(self.quiet, Ordering::Relaxed);
        JSON.store(self.json, Ordering::Relaxed);
        VERBOSE.store(self.verbose, Ordering::Relaxed);
    }

    /// Run log verbosity for a configured base level
    pub fn verbosity(&self, base: Verbosity) -> Verbosity {
        if self.quiet || self.json {
            Verbosity::Silent
        } else {
            base.raised(self.verbose)
        }
    }
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

pub fn verbose_level() -> u8 {
    VERBOSE.load(Ordering::Relaxed)
}

fn is_silent() -> bool {
    is_quiet() || is_json()
}

/// Print a success line
pub fn print_success(message: &str) {
    if !is_silent() {
        println!("{} {message}", status::SUCCESS);
    }
}

/// Print an informational line
pub fn print_info(message: &str) {
    if !is_silent() {
        println!("{} {message}", status::INFO);
    }
}

/// Print an indented detail line
pub fn print_detail(message: &str) {
    if !is_silent() {
        println!("  {message}");
    }
}

/// Report a failed command
///
/// In JSON mode the error goes to stdout as `{"status":"error",...}` so
/// scripts see one document either way.
pub fn display_error(error: &anyhow::Error) {
    if is_json() {
        let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
        let json = serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return;
    }

    eprintln!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Run log rendered on the terminal
///
/// Each stage gets a spinner until the next stage or the closing
/// announcement. Tool errors go to stderr.
#[derive(Debug)]
pub struct ConsoleSink {
    verbosity: Verbosity,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            spinner: Mutex::new(None),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn finish_spinner(spinner: &mut Option<ProgressBar>) {
        if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl LogSink for ConsoleSink {
    fn log(&self, kind: LogKind, message: &str) {
        if !self.verbosity.shows(kind) {
            return;
        }

        let Ok(mut spinner) = self.spinner.lock() else {
            eprintln!("{message}");
            return;
        };

        match kind {
            LogKind::Stage => {
                Self::finish_spinner(&mut spinner);
                println!("{message}");
                let title = message.trim_matches(|c: char| c == '-' || c.is_whitespace());
                *spinner = Some(create_spinner(title));
            }
            LogKind::Announce => {
                Self::finish_spinner(&mut spinner);
                println!("{message}");
            }
            LogKind::Urgent => match spinner.as_ref() {
                Some(pb) => pb.suspend(|| eprintln!("{message}")),
                None => eprintln!("{message}"),
            },
            _ => match spinner.as_ref() {
                Some(pb) => pb.suspend(|| println!("{message}")),
                None => println!("{message}"),
            },
        }
    }
}

impl Drop for ConsoleSink {
    fn drop(&mut self) {
        if let Ok(spinner) = self.spinner.get_mut() {
            Self::finish_spinner(spinner);
        }
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_and_json_silence_the_run_log() {
        assert_eq!(
            OutputConfig::new(true, false, 2).verbosity(Verbosity::Normal),
            Verbosity::Silent
        );
        assert_eq!(
            OutputConfig::new(false, true, 0).verbosity(Verbosity::Debug),
            Verbosity::Silent
        );
    }

    #[test]
    fn test_verbose_flag_raises_level() {
        let config = OutputConfig::new(false, false, 1);
        assert_eq!(config.verbosity(Verbosity::Normal), Verbosity::Verbose);
        assert_eq!(
            OutputConfig::new(false, false, 2).verbosity(Verbosity::Normal),
            Verbosity::Debug
        );
    }

    #[test]
    fn test_console_sink_accepts_every_kind() {
        let sink = ConsoleSink::new(Verbosity::Silent);
        sink.stage("--- Packing SPIFFS file ---");
        sink.important("hidden");
        sink.announce("done");
        assert_eq!(sink.verbosity(), Verbosity::Silent);
    }
}
