//! Manifest command handlers
//!
//! Offline inspection of workflow manifests saved to disk.

use anyhow::{Context, Result};
use clap::Subcommand;
use runlens_core::{RunManifest, workflow_dot};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::display::{print_run_tree, write_dot};
use crate::config::SchemaKind;

/// Manifest subcommands
#[derive(Subcommand)]
pub enum ManifestCommands {
    /// Parse a saved workflow manifest and print its nodes
    Inspect {
        /// Path to a workflow manifest JSON file
        file: PathBuf,

        /// Manifest flavour of the file
        #[arg(long, value_enum, default_value = "kfp-v1")]
        schema: SchemaKind,

        /// Print one JSON record per node instead of the tree
        #[arg(long)]
        json: bool,
    },
    /// Render the node graph of a saved workflow manifest as DOT
    Graph {
        /// Path to a workflow manifest JSON file
        file: PathBuf,

        /// Manifest flavour of the file
        #[arg(long, value_enum, default_value = "kfp-v1")]
        schema: SchemaKind,

        /// Write the DOT source here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle manifest commands
pub fn handle_manifest_command(command: ManifestCommands) -> Result<()> {
    match command {
        ManifestCommands::Inspect { file, schema, json } => inspect(&file, schema, json),
        ManifestCommands::Graph {
            file,
            schema,
            output,
        } => graph(&file, schema, output.as_deref()),
    }
}

fn inspect(file: &Path, schema: SchemaKind, json: bool) -> Result<()> {
    let run = load(file, schema)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run.node_records())?);
    } else {
        print_run_tree(&run);
    }

    Ok(())
}

fn graph(file: &Path, schema: SchemaKind, output: Option<&Path>) -> Result<()> {
    let document = read_document(file)?;
    let dot = workflow_dot(&document, &schema.schema())
        .with_context(|| format!("Failed to render graph of {}", file.display()))?;

    write_dot(&dot, output)
}

fn read_document(file: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read manifest {}", file.display()))?;

    serde_json::from_str(&text).with_context(|| format!("Manifest {} is not valid JSON", file.display()))
}

fn load(file: &Path, schema: SchemaKind) -> Result<RunManifest> {
    let document = read_document(file)?;

    RunManifest::from_value(&document, &schema.schema())
        .with_context(|| format!("Failed to parse manifest {}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn argo_manifest() -> Value {
        json!({
            "metadata": { "name": "hello-abc12", "uid": "uid-1" },
            "spec": { "templates": [ { "name": "hello" } ] },
            "status": {
                "phase": "Succeeded",
                "startedAt": "2024-01-01T00:00:00Z",
                "finishedAt": "2024-01-01T00:00:03Z",
                "nodes": {
                    "hello-abc12": { "id": "hello-abc12", "type": "DAG", "displayName": "hello-abc12",
                                     "children": ["hello-abc12-1"] },
                    "hello-abc12-1": { "id": "hello-abc12-1", "type": "Pod", "templateName": "hello",
                                       "displayName": "hello", "phase": "Succeeded" }
                }
            }
        })
    }

    #[test]
    fn test_load_argo_manifest_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wf.json");
        std::fs::write(&path, argo_manifest().to_string()).unwrap();

        let run = load(&path, SchemaKind::Argo).unwrap();
        assert_eq!(run.run_id(), "uid-1");
        assert_eq!(run.run_name(), "hello-abc12");
        assert_eq!(run.len(), 1);
    }

    #[test]
    fn test_load_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = load(&path, SchemaKind::KfpV1).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_graph_writes_dot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wf.json");
        let out = dir.path().join("wf.dot");
        std::fs::write(&path, argo_manifest().to_string()).unwrap();

        graph(&path, SchemaKind::Argo, Some(&out)).unwrap();

        let dot = std::fs::read_to_string(&out).unwrap();
        assert!(dot.starts_with("digraph \"hello-abc12\" {"));
        assert!(dot.contains("\"hello-abc12\" -> \"hello-abc12-1\";"));
        assert!(dot.contains("fillcolor=aqua"));
        assert!(dot.contains("fillcolor=azure3"));
    }
}
