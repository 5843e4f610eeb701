//! Workflow graph export
//!
//! Renders the full node graph of a workflow manifest as Graphviz DOT
//! source. Unlike the run view this keeps every node type (DAGs, task
//! groups, retries) so the control structure is visible. Turning the DOT
//! text into an image is left to Graphviz.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::schema::ManifestSchema;

/// Fill colour of execution nodes
const EXECUTION_FILL: &str = "aqua";

/// Fill colour of every other node type
const CONTROL_FILL: &str = "azure3";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphNode {
    #[serde(rename = "type")]
    node_type: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    children: Vec<String>,
}

/// Render a workflow manifest's node graph as DOT source
///
/// Nodes are labelled `"{displayName} ({id})"`, carry their raw JSON as a
/// tooltip and are linked by their `children` lists. Nodes whose type is
/// the schema's execution type are filled differently from control nodes.
pub fn workflow_dot(document: &Value, schema: &ManifestSchema) -> Result<String> {
    let name = document
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::missing("metadata.name"))?;

    let empty = Map::new();
    let nodes = document
        .pointer("/status/nodes")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut dot = String::new();
    let mut edges = Vec::new();
    let _ = writeln!(dot, "digraph {} {{", quote(name));

    for (id, value) in nodes {
        let node = GraphNode::deserialize(value)
            .map_err(|e| Error::missing(format!("status.nodes.{}: {}", id, e)))?;
        let node_type = node
            .node_type
            .ok_or_else(|| Error::missing(format!("status.nodes.{}.type", id)))?;
        let display_name = node
            .display_name
            .ok_or_else(|| Error::missing(format!("status.nodes.{}.displayName", id)))?;

        let fill = if node_type == schema.execution_node_type {
            EXECUTION_FILL
        } else {
            CONTROL_FILL
        };
        let tooltip = serde_json::to_string_pretty(value)?;

        let _ = writeln!(
            dot,
            "  {} [label={}, tooltip={}, style=filled, fillcolor={}];",
            quote(id),
            quote(&format!("{} ({})", display_name, id)),
            quote(&tooltip),
            fill
        );

        edges.extend(node.children.into_iter().map(|child| (id.as_str(), child)));
    }

    for (parent, child) in edges {
        let _ = writeln!(dot, "  {} -> {};", quote(parent), quote(&child));
    }
    dot.push_str("}\n");

    Ok(dot)
}

/// Quote a DOT identifier
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::json;

    fn dag_with_pods() -> Value {
        let (dag_id, mut dag) = fixtures::group("wf", "DAG", "fixture-wf-x7k2p");
        dag["children"] = json!(["wf-1", "wf-2"]);
        let (group_id, mut group) = fixtures::group("wf-2", "TaskGroup", "for-each");
        group["children"] = json!(["wf-3"]);

        fixtures::workflow(
            json!({ "phase": "Running", "startedAt": "2024-01-01T00:00:00Z" }),
            vec![
                (dag_id, dag),
                fixtures::pod("wf-1", "a", "Say \"hi\"", "Succeeded"),
                (group_id, group),
                fixtures::pod("wf-3", "a", "replica", "Running"),
            ],
            vec![fixtures::template("a", None)],
        )
    }

    #[test]
    fn test_graph_keeps_every_node_type() {
        let dot = workflow_dot(&dag_with_pods(), &ManifestSchema::kfp_v1()).unwrap();

        assert!(dot.starts_with("digraph \"fixture-wf-x7k2p\" {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("\"wf\" [label=\"fixture-wf-x7k2p (wf)\""));
        assert!(dot.contains("\"wf-2\" [label=\"for-each (wf-2)\""));
        assert!(dot.contains("\"wf-3\" [label=\"replica (wf-3)\""));
    }

    #[test]
    fn test_graph_fill_by_node_type() {
        let dot = workflow_dot(&dag_with_pods(), &ManifestSchema::kfp_v1()).unwrap();
        let line = |id: &str| {
            dot.lines()
                .find(|l| l.starts_with(&format!("  \"{}\" [", id)))
                .unwrap()
                .to_string()
        };

        assert!(line("wf").ends_with("fillcolor=azure3];"));
        assert!(line("wf-1").ends_with("fillcolor=aqua];"));
        assert!(line("wf-2").ends_with("fillcolor=azure3];"));
    }

    #[test]
    fn test_graph_edges_follow_children() {
        let dot = workflow_dot(&dag_with_pods(), &ManifestSchema::kfp_v1()).unwrap();
        let edges: Vec<&str> = dot.lines().filter(|l| l.contains("->")).collect();

        assert_eq!(
            edges,
            vec!["  \"wf\" -> \"wf-1\";", "  \"wf\" -> \"wf-2\";", "  \"wf-2\" -> \"wf-3\";"]
        );
    }

    #[test]
    fn test_graph_escapes_labels_and_tooltips() {
        let dot = workflow_dot(&dag_with_pods(), &ManifestSchema::kfp_v1()).unwrap();
        assert!(dot.contains("label=\"Say \\\"hi\\\" (wf-1)\""));
        // Tooltips hold the pretty-printed node, one DOT line per node
        assert_eq!(dot.lines().filter(|l| l.contains("tooltip=")).count(), 4);
    }

    #[test]
    fn test_graph_without_nodes() {
        let doc = json!({ "metadata": { "name": "fresh" }, "status": {} });
        assert_eq!(
            workflow_dot(&doc, &ManifestSchema::argo()).unwrap(),
            "digraph \"fresh\" {\n}\n"
        );
    }

    #[test]
    fn test_graph_requires_workflow_name() {
        let err = workflow_dot(&json!({ "status": {} }), &ManifestSchema::kfp_v1()).unwrap_err();
        assert!(matches!(err, Error::MissingField(_)));
    }
}
