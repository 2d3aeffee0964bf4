//! External process execution
//!
//! Commands run to completion with captured output. Standard output is
//! echoed to the run log as tool output, standard error as urgent lines.

use std::process::Command;

use crate::core::command::CommandLine;
use crate::core::report::{LogKind, LogSink};
use crate::error::{Result, UploadError};

/// Run a command and fail on a non-zero exit status
pub fn run(command: &CommandLine, sink: &dyn LogSink) -> Result<()> {
    sink.verbose(&format!("Running: {command}"));
    tracing::debug!(program = %command.program.display(), "spawning");

    let output = Command::new(&command.program)
        .args(&command.args)
        .output()
        .map_err(|e| UploadError::ProcessSpawn {
            program: command.program.clone(),
            error: e.to_string(),
        })?;

    echo(&String::from_utf8_lossy(&output.stdout), LogKind::Output, sink);
    echo(&String::from_utf8_lossy(&output.stderr), LogKind::Urgent, sink);

    if output.status.success() {
        Ok(())
    } else {
        Err(UploadError::ProcessFailure {
            program: command.program.clone(),
            code: output.status.code(),
        })
    }
}

fn echo(text: &str, kind: LogKind, sink: &dyn LogSink) {
    for line in text.lines() {
        let line = line.trim_end();
        if !line.is_empty() {
            sink.log(kind, line);
        }
    }
}
