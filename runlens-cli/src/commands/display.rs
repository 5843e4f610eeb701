//! Terminal rendering shared by the command handlers

use anyhow::{Context, Result};
use colored::*;
use runlens_core::domain::timing::format_duration;
use runlens_core::{ExecutionNode, RunManifest, StatusFlags};
use std::path::Path;

/// Colorize a status token by its classification
pub fn colorize_status(status: Option<&str>, flags: StatusFlags) -> ColoredString {
    let text = status.unwrap_or("Unknown");
    if flags.succeeded {
        text.green()
    } else if flags.failed {
        text.red()
    } else if flags.running {
        text.cyan()
    } else if flags.pending {
        text.yellow()
    } else {
        text.dimmed()
    }
}

/// Print a run header followed by one line per node
pub fn print_run_tree(run: &RunManifest) {
    println!("{}", "Run Details:".bold());
    println!("  ID:        {}", run.run_id().cyan());
    println!("  Name:      {}", run.run_name());
    if let Some(workflow) = run.workflow_name() {
        println!("  Workflow:  {}", workflow.dimmed());
    }
    println!("  Status:    {}", colorize_status(run.status(), run.flags()));
    if let Some(started) = run.started_at() {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(finished) = run.finished_at() {
        println!("  Finished:  {}", finished.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("  Duration:  {}", format_duration(run.duration()));

    if run.is_empty() {
        println!("\n{}", "No execution nodes yet.".yellow());
        return;
    }

    println!("\n{}", format!("Nodes ({}):", run.len()).bold());
    for node in run.nodes() {
        print_node_summary(node);
    }
}

/// Write DOT source to a file, or to stdout when no path is given
pub fn write_dot(dot: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, dot)
                .with_context(|| format!("Failed to write graph to {}", path.display()))?;
            println!("{} {}", "✓".green(), path.display());
        }
        None => print!("{}", dot),
    }
    Ok(())
}

/// Print a single node line
pub fn print_node_summary(node: &ExecutionNode) {
    println!(
        "  {} {} {} {}",
        "▸".cyan(),
        node.display_name,
        colorize_status(node.status.as_deref(), node.flags),
        format_duration(node.duration()).dimmed()
    );
    if let Some(message) = &node.message {
        println!("      {}", message.red());
    }
}
