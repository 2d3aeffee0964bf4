//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod upload;

use anyhow::Result;
use clap::Subcommand;

use super::RunContext;
use crate::core::session::RunMode;

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Commands {
    /// Pack the data directory and upload it (default)
    #[default]
    Upload,

    /// Pack the data directory into spiffs.bin without uploading
    Pack,

    /// Show the resolved layout, tools and commands without running them
    Plan,
}

impl Commands {
    /// Session mode for this command
    pub fn mode(self) -> RunMode {
        match self {
            Self::Upload => RunMode::Upload,
            Self::Pack => RunMode::Pack,
            Self::Plan => RunMode::Plan,
        }
    }

    /// Execute the command
    pub async fn run(self, context: RunContext) -> Result<()> {
        match self {
            Self::Plan => upload::execute_plan(context).await,
            Self::Upload | Self::Pack => upload::execute(context, self.mode()).await,
        }
    }
}
