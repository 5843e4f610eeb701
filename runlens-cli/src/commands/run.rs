//! Run command handlers
//!
//! Handles all run-related CLI commands including listing, viewing details,
//! watching a run to completion and pulling logs and outputs.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use runlens_client::PlatformClient;
use runlens_core::dto::run::ApiRun;
use runlens_core::dump::dump_manifests;
use runlens_core::{ExecutionNode, RunManifest, classify, workflow_dot};
use std::path::PathBuf;

use super::display::{colorize_status, print_node_summary, print_run_tree, write_dot};
use crate::config::{Config, wait_options};
use crate::id_resolver::resolve_run_id;
use crate::types::IdOrPrefix;

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// List recent runs
    List {
        /// Number of runs to show
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Get run details and its nodes
    Get {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Poll a run until it and all of its nodes have finished
    Watch {
        /// Run ID or unambiguous prefix
        id: String,

        /// Delay between polls in milliseconds
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
    /// Print the container logs of a node
    Logs {
        /// Run ID or unambiguous prefix
        id: String,

        /// Display name of the node
        #[arg(long)]
        node: String,
    },
    /// Print the typed outputs of a node
    Outputs {
        /// Run ID or unambiguous prefix
        id: String,

        /// Display name of the node
        #[arg(long)]
        node: String,

        /// Keep the template prefix on output names
        #[arg(long)]
        raw_names: bool,
    },
    /// Write the runtime and spec manifests of a run to disk
    Dump {
        /// Run ID or unambiguous prefix
        id: String,

        /// File name prefix (defaults to the run id)
        #[arg(long)]
        name: Option<String>,

        /// Output directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Show the task view of a run from the v2 API
    Tasks {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Render the node graph of a run as DOT
    Graph {
        /// Run ID or unambiguous prefix
        id: String,

        /// Write the DOT source here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle run commands
///
/// Routes run subcommands to their respective handlers.
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = PlatformClient::new(&config.platform_url);

    match command {
        RunCommands::List { page_size } => list_runs(&client, page_size).await,
        RunCommands::Get { id } => get_run(&client, &id, config).await,
        RunCommands::Watch {
            id,
            interval_ms,
            timeout_secs,
        } => watch_run(&client, &id, interval_ms, timeout_secs, config).await,
        RunCommands::Logs { id, node } => node_logs(&client, &id, &node, config).await,
        RunCommands::Outputs {
            id,
            node,
            raw_names,
        } => node_outputs(&client, &id, &node, !raw_names, config).await,
        RunCommands::Dump { id, name, dir } => dump_run(&client, &id, name, dir).await,
        RunCommands::Tasks { id } => run_tasks(&client, &id).await,
        RunCommands::Graph { id, output } => run_graph(&client, &id, output, config).await,
    }
}

/// List recent runs
async fn list_runs(client: &PlatformClient, page_size: u32) -> Result<()> {
    let page = client.list_runs(page_size, None).await?;

    if page.runs.is_empty() {
        println!("{}", "No runs found.".yellow());
    } else {
        println!(
            "{}",
            format!("Showing {} of {} run(s):", page.runs.len(), page.total_size).bold()
        );
        println!();
        for run in &page.runs {
            print_run_summary(run);
        }
    }

    Ok(())
}

/// Get and display a single run
async fn get_run(client: &PlatformClient, id: &str, config: &Config) -> Result<()> {
    let run = snapshot(client, id, config).await?;
    print_run_tree(&run);
    Ok(())
}

/// Poll a run to completion, printing each snapshot
async fn watch_run(
    client: &PlatformClient,
    id: &str,
    interval_ms: u64,
    timeout_secs: u64,
    config: &Config,
) -> Result<()> {
    let options = wait_options(interval_ms, timeout_secs)?;
    let run_id = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;

    let mut last_line = String::new();
    let run = client
        .wait_for_completion(&run_id, &config.platform_schema(), &options, |snapshot| {
            let line = snapshot.to_string();
            if line != last_line {
                println!("{}", line.dimmed());
                last_line = line;
            }
        })
        .await?;

    println!();
    print_run_tree(&run);
    Ok(())
}

/// Print the logs of every node with the given display name
async fn node_logs(client: &PlatformClient, id: &str, node: &str, config: &Config) -> Result<()> {
    let run = snapshot(client, id, config).await?;

    for target in select_nodes(&run, node)? {
        let logs = run
            .pull_logs(target)
            .await
            .with_context(|| format!("Failed to read logs of node {}", target.id))?;

        println!("{}", format!("Logs for node {} ({}):", target.display_name, target.id).bold());
        println!("{}", "─".repeat(80).dimmed());
        print!("{}", logs);
        if !logs.ends_with('\n') {
            println!();
        }
        println!("{}", "─".repeat(80).dimmed());
    }

    Ok(())
}

/// Print the typed outputs of every node with the given display name
async fn node_outputs(
    client: &PlatformClient,
    id: &str,
    node: &str,
    normalize: bool,
    config: &Config,
) -> Result<()> {
    let run = snapshot(client, id, config).await?;

    for target in select_nodes(&run, node)? {
        let outputs = run
            .pull_outputs(target, normalize)
            .await
            .with_context(|| format!("Failed to read outputs of node {}", target.id))?;

        print_node_summary(target);
        if outputs.is_empty() {
            println!("    {}", "No typed outputs.".yellow());
        }
        for (name, value) in &outputs {
            println!("    {} = {}", name.cyan(), value);
        }
    }

    Ok(())
}

/// Dump the manifests of a run for offline debugging
async fn dump_run(
    client: &PlatformClient,
    id: &str,
    name: Option<String>,
    dir: PathBuf,
) -> Result<()> {
    let run_id = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let detail = client.get_run(&run_id).await?;

    let name = name.unwrap_or_else(|| run_id.clone());
    let paths = dump_manifests(&dir, &name, &detail)
        .with_context(|| format!("Failed to dump manifests of run {}", run_id))?;

    println!("{} {}", "✓".green(), paths.runtime.display());
    println!("{} {}", "✓".green(), paths.spec.display());
    Ok(())
}

/// Show the v2 task view of a run
async fn run_tasks(client: &PlatformClient, id: &str) -> Result<()> {
    let run_id = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let run = client.fetch_manifest_v2(&run_id).await?;
    print_run_tree(&run);
    Ok(())
}

/// Render the runtime node graph of a run
async fn run_graph(
    client: &PlatformClient,
    id: &str,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let run_id = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let detail = client.get_run(&run_id).await?;

    let document = detail
        .runtime_manifest()
        .with_context(|| format!("Run {} has no workflow yet", run_id))?;
    let dot = workflow_dot(&document, &config.platform_schema())?;

    write_dot(&dot, output.as_deref())
}

async fn snapshot(client: &PlatformClient, id: &str, config: &Config) -> Result<RunManifest> {
    let run_id = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let run = client.fetch_manifest(&run_id, &config.platform_schema()).await?;
    Ok(run)
}

fn select_nodes<'a>(run: &'a RunManifest, display_name: &str) -> Result<Vec<&'a ExecutionNode>> {
    let nodes = run.get_nodes(display_name);
    if nodes.is_empty() {
        let mut names: Vec<&str> = run.nodes().iter().map(|n| n.display_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        bail!(
            "No node named '{}' in run {}. Known nodes: {}",
            display_name,
            run.run_id(),
            names.join(", ")
        );
    }
    Ok(nodes)
}

/// Print a run summary line from the run list
fn print_run_summary(run: &ApiRun) {
    let status = run.status.as_deref();
    let flags = classify(status, &Default::default());

    println!("  {} {} {}", "▸".cyan(), run.name, run.id.dimmed());
    println!("    Status:   {}", colorize_status(status, flags));
    if let Some(created) = run.created_at {
        println!("    Created:  {}", created.format("%Y-%m-%d %H:%M:%S").to_string().dimmed());
    }
    if let Some(error) = &run.error {
        println!("    Error:    {}", error.red());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use runlens_core::ManifestSchema;
    use serde_json::json;

    fn run_with_nodes() -> RunManifest {
        let manifest = json!({
            "metadata": { "name": "wf", "uid": "uid-1" },
            "spec": { "templates": [ { "name": "step" } ] },
            "status": {
                "phase": "Running",
                "nodes": {
                    "wf-1": { "type": "Pod", "templateName": "step", "displayName": "train", "phase": "Succeeded" },
                    "wf-2": { "type": "Pod", "templateName": "step", "displayName": "train", "phase": "Running" },
                    "wf-3": { "type": "Pod", "templateName": "step", "displayName": "eval", "phase": "Pending" }
                }
            }
        });
        RunManifest::from_value(&manifest, &ManifestSchema::argo()).unwrap()
    }

    #[test]
    fn test_select_nodes_returns_every_match() {
        let run = run_with_nodes();
        let nodes = select_nodes(&run, "train").unwrap();
        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["wf-1", "wf-2"]);
    }

    #[test]
    fn test_select_nodes_lists_known_names() {
        let run = run_with_nodes();
        let err = select_nodes(&run, "deploy").unwrap_err();
        assert!(err.to_string().contains("Known nodes: eval, train"));
    }
}
