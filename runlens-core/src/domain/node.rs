//! Execution node domain types

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::StatusFlags;
use super::timing::{Timing, format_duration};

/// One execution unit (a single pod) within a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionNode {
    /// Engine-assigned node name, unique within a manifest
    pub id: String,

    /// Human-facing name; may repeat across parallel replicas
    pub display_name: String,

    /// Template this node was instantiated from
    pub template_name: Option<String>,

    /// Raw platform status token
    pub status: Option<String>,

    pub flags: StatusFlags,

    pub timing: Timing,

    pub message: Option<String>,

    /// Outputs in declaration order
    pub artifacts: Vec<ArtifactDescriptor>,
}

impl ExecutionNode {
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

    pub fn finished(&self) -> bool {
        self.flags.finished()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.timing.started_at()
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.timing.finished_at()
    }

    /// Duration of the node; grows from the local clock while it is running
    pub fn duration(&self) -> TimeDelta {
        self.timing.duration()
    }

    /// Look up a declared artifact by name
    pub fn artifact(&self, name: &str) -> Option<&ArtifactDescriptor> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    pub fn artifact_names(&self) -> Vec<String> {
        self.artifacts.iter().map(|a| a.name.clone()).collect()
    }
}

impl fmt::Display for ExecutionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node(name={}, status={}, duration={})",
            self.display_name,
            self.status.as_deref().unwrap_or("None"),
            format_duration(self.duration())
        )
    }
}

/// An output declared on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub name: String,

    /// Path inside the container the output was collected from
    pub path: Option<String>,

    /// Declared primitive type, when the component spec names one
    pub declared_type: Option<OutputType>,
}

/// Declared primitive type of a component output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputType {
    Integer,
    Float,
    Boolean,
    String,
    JsonObject,
}

impl OutputType {
    /// Parse a component-spec type name; unknown names yield `None`
    pub fn from_spec(type_name: &str) -> Option<Self> {
        match type_name {
            "Integer" => Some(Self::Integer),
            "Float" => Some(Self::Float),
            "Boolean" => Some(Self::Boolean),
            "String" => Some(Self::String),
            "JsonObject" => Some(Self::JsonObject),
            _ => None,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Integer => write!(f, "Integer"),
            OutputType::Float => write!(f, "Float"),
            OutputType::Boolean => write!(f, "Boolean"),
            OutputType::String => write!(f, "String"),
            OutputType::JsonObject => write!(f, "JsonObject"),
        }
    }
}

/// A coerced output value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Json(serde_json::Value),
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputValue::Integer(v) => write!(f, "{}", v),
            OutputValue::Float(v) => write!(f, "{}", v),
            OutputValue::Boolean(v) => write!(f, "{}", v),
            OutputValue::String(v) => write!(f, "{}", v),
            OutputValue::Json(v) => write!(f, "{}", v),
        }
    }
}
