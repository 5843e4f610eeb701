//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod display;
mod manifest;
mod run;

pub use manifest::ManifestCommands;
pub use run::RunCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Saved workflow manifests
    Manifest {
        #[command(subcommand)]
        command: ManifestCommands,
    },
    /// Runs on the pipeline platform
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Manifest { command } => manifest::handle_manifest_command(command),
        Commands::Run { command } => run::handle_run_command(command, config).await,
    }
}
