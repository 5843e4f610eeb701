//! Runlens CLI
//!
//! Command-line interface for inspecting pipeline runs and their manifests.

mod commands;
mod config;
mod id_resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "runlens")]
#[command(about = "Inspect pipeline runs and workflow manifests", long_about = None)]
struct Cli {
    /// Pipeline platform URL
    #[arg(
        long,
        global = true,
        env = "RUNLENS_PLATFORM_URL",
        default_value = "http://localhost:8888"
    )]
    platform_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runlens=warn,runlens_core=warn,runlens_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::new(cli.platform_url);
    config.validate()?;

    handle_command(cli.command, &config).await
}
