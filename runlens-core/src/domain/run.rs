//! Run manifest view
//!
//! A `RunManifest` is an immutable snapshot of one run, built once from a
//! fetched document. Observing progress means fetching again and building a
//! new snapshot.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::node::ExecutionNode;
use super::status::{StatusFlags, classify};
use super::timing::{Timing, format_duration};
use crate::artifact::ArtifactFetcher;
use crate::error::{Error, Result};
use crate::schema::ManifestSchema;

/// Queryable view of a run and its execution nodes
#[derive(Clone)]
pub struct RunManifest {
    run_id: String,
    run_name: String,
    workflow_name: Option<String>,
    status: Option<String>,
    flags: StatusFlags,
    timing: Timing,
    nodes: Vec<ExecutionNode>,
    index: HashMap<String, usize>,
    schema: ManifestSchema,
    fetcher: Option<Arc<dyn ArtifactFetcher>>,
}

/// Parsed run-level fields handed over by a parser
pub(crate) struct RunParts {
    pub run_id: String,
    pub run_name: String,
    pub workflow_name: Option<String>,
    pub status: Option<String>,
    pub timing: Timing,
    pub nodes: Vec<ExecutionNode>,
    pub schema: ManifestSchema,
}

impl RunManifest {
    pub(crate) fn assemble(parts: RunParts) -> Result<Self> {
        let mut index = HashMap::with_capacity(parts.nodes.len());
        for (position, node) in parts.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), position).is_some() {
                return Err(Error::Inconsistent(format!(
                    "node id '{}' appears more than once",
                    node.id
                )));
            }
        }

        let flags = classify(parts.status.as_deref(), &parts.schema.tokens);

        Ok(Self {
            run_id: parts.run_id,
            run_name: parts.run_name,
            workflow_name: parts.workflow_name,
            status: parts.status,
            flags,
            timing: parts.timing,
            nodes: parts.nodes,
            index,
            schema: parts.schema,
            fetcher: None,
        })
    }

    /// Attach the capability used to pull logs and artifacts
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn has_fetcher(&self) -> bool {
        self.fetcher.is_some()
    }

    pub(crate) fn fetcher(&self) -> Option<&Arc<dyn ArtifactFetcher>> {
        self.fetcher.as_ref()
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Name of the backing workflow object, when the document reveals it
    pub fn workflow_name(&self) -> Option<&str> {
        self.workflow_name.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn flags(&self) -> StatusFlags {
        self.flags
    }

    pub fn schema(&self) -> &ManifestSchema {
        &self.schema
    }

    pub fn pending(&self) -> bool {
        self.flags.pending
    }

    pub fn running(&self) -> bool {
        self.flags.running
    }

    pub fn succeeded(&self) -> bool {
        self.flags.succeeded
    }

    pub fn failed(&self) -> bool {
        self.flags.failed
    }

    pub fn skipped(&self) -> bool {
        self.flags.skipped
    }

    /// Run-level status is terminal
    pub fn finished(&self) -> bool {
        self.flags.finished()
    }

    /// Run-level status and every node status are terminal
    ///
    /// The run can report a terminal status before its nodes catch up, so
    /// polling loops should wait on this rather than `finished`.
    pub fn all_finished(&self) -> bool {
        self.finished() && self.nodes.iter().all(ExecutionNode::finished)
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.timing.started_at()
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.timing.finished_at()
    }

    /// Duration of the run; grows from the local clock while it is running
    pub fn duration(&self) -> TimeDelta {
        self.timing.duration()
    }

    /// Execution nodes in source order
    pub fn nodes(&self) -> &[ExecutionNode] {
        &self.nodes
    }

    /// Look up a node by its engine-assigned id
    pub fn node(&self, id: &str) -> Option<&ExecutionNode> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    /// All nodes sharing a display name, in source order
    pub fn get_nodes(&self, display_name: &str) -> Vec<&ExecutionNode> {
        self.nodes
            .iter()
            .filter(|n| n.display_name == display_name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run line followed by one indented line per node
    pub fn display_tree(&self) -> String {
        let mut out = self.to_string();
        for node in &self.nodes {
            out.push_str("\n  ");
            out.push_str(&node.to_string());
        }
        out
    }
}

impl fmt::Display for RunManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DAG(name={}, status={}, duration={})",
            self.run_name,
            self.status.as_deref().unwrap_or("None"),
            format_duration(self.duration())
        )
    }
}

impl fmt::Debug for RunManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunManifest")
            .field("run_id", &self.run_id)
            .field("run_name", &self.run_name)
            .field("workflow_name", &self.workflow_name)
            .field("status", &self.status)
            .field("timing", &self.timing)
            .field("nodes", &self.nodes)
            .field("has_fetcher", &self.fetcher.is_some())
            .finish()
    }
}
