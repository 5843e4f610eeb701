//! Manifest parser
//!
//! Turns a workflow manifest document into a `RunManifest`. Parsing is
//! eager: every field the view exposes is read and validated here, so a
//! malformed document fails at construction instead of on first access.

pub mod v2;

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::node::{ArtifactDescriptor, ExecutionNode, OutputType};
use crate::domain::run::{RunManifest, RunParts};
use crate::domain::status::classify;
use crate::domain::timing::{Timing, parse_optional};
use crate::dto::run::RunDetail;
use crate::error::{Error, Result};
use crate::schema::ManifestSchema;

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    name: Option<String>,
    uid: Option<String>,
    #[serde(default)]
    labels: HashMap<String, String>,
    #[serde(default)]
    annotations: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpec {
    #[serde(default)]
    templates: Vec<RawTemplate>,
}

#[derive(Debug, Deserialize)]
struct RawTemplate {
    name: String,
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    outputs: RawOutputs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    phase: Option<String>,
    started_at: Option<String>,
    finished_at: Option<String>,
    nodes: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: Option<String>,
    #[serde(rename = "type")]
    node_type: Option<String>,
    template_name: Option<String>,
    display_name: Option<String>,
    phase: Option<String>,
    started_at: Option<String>,
    finished_at: Option<String>,
    message: Option<String>,
    #[serde(default)]
    outputs: Option<RawOutputs>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutputs {
    #[serde(default)]
    artifacts: Vec<RawArtifact>,
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    name: String,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComponentSpec {
    #[serde(default)]
    outputs: Vec<ComponentOutput>,
}

#[derive(Debug, Deserialize)]
struct ComponentOutput {
    #[serde(rename = "type")]
    output_type: Option<Value>,
}

impl RunManifest {
    /// Build a view from a parsed workflow manifest
    pub fn from_value(document: &Value, schema: &ManifestSchema) -> Result<Self> {
        parse_workflow(document, schema)
    }

    /// Build a view from workflow manifest JSON text
    pub fn from_json_str(json: &str, schema: &ManifestSchema) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        parse_workflow(&document, schema)
    }

    /// Build a view from the runtime manifest embedded in a run detail
    pub fn from_run_detail(detail: &RunDetail, schema: &ManifestSchema) -> Result<Self> {
        let document = detail.runtime_manifest()?;
        parse_workflow(&document, schema)
    }
}

fn section<T: for<'de> Deserialize<'de> + Default>(document: &Value, key: &str) -> Result<T> {
    match document.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => T::deserialize(value).map_err(|e| Error::missing(format!("{}: {}", key, e))),
    }
}

fn parse_workflow(document: &Value, schema: &ManifestSchema) -> Result<RunManifest> {
    if document.get("metadata").is_none() {
        return Err(Error::missing("metadata"));
    }
    let metadata: RawMetadata = section(document, "metadata")?;
    let spec: RawSpec = section(document, "spec")?;
    let status: RawStatus = section(document, "status")?;

    let run_id = match &schema.run_id_label {
        Some(label) => metadata.labels.get(label).cloned(),
        None => metadata.uid.clone(),
    }
    .ok_or_else(|| match &schema.run_id_label {
        Some(label) => Error::missing(format!("metadata.labels.{}", label)),
        None => Error::missing("metadata.uid"),
    })?;

    let run_name = match &schema.run_name_annotation {
        Some(annotation) => metadata.annotations.get(annotation).cloned(),
        None => metadata.name.clone(),
    }
    .ok_or_else(|| match &schema.run_name_annotation {
        Some(annotation) => Error::missing(format!("metadata.annotations.{}", annotation)),
        None => Error::missing("metadata.name"),
    })?;

    let timing = Timing::new(
        parse_optional(status.started_at.as_deref())?,
        parse_optional(status.finished_at.as_deref())?,
    )?;

    let nodes = match &status.nodes {
        // Freshly submitted runs have no nodes yet
        None => Vec::new(),
        Some(raw_nodes) => {
            let templates: HashMap<&str, &RawTemplate> = spec
                .templates
                .iter()
                .map(|t| (t.name.as_str(), t))
                .collect();
            parse_nodes(raw_nodes, &templates, schema)?
        }
    };

    debug!(run_id = %run_id, nodes = nodes.len(), "Parsed workflow manifest");

    RunManifest::assemble(RunParts {
        run_id,
        run_name,
        workflow_name: metadata.name,
        status: status.phase,
        timing,
        nodes,
        schema: schema.clone(),
    })
}

fn parse_nodes(
    raw_nodes: &Map<String, Value>,
    templates: &HashMap<&str, &RawTemplate>,
    schema: &ManifestSchema,
) -> Result<Vec<ExecutionNode>> {
    let mut nodes = Vec::new();

    for (key, value) in raw_nodes {
        let raw = RawNode::deserialize(value)
            .map_err(|e| Error::missing(format!("status.nodes.{}: {}", key, e)))?;

        let node_type = raw
            .node_type
            .as_deref()
            .ok_or_else(|| Error::missing(format!("status.nodes.{}.type", key)))?;

        // DAG, TaskGroup, Retry, ... stay in the raw document only
        if node_type != schema.execution_node_type {
            debug!(node = %key, node_type, "Skipping non-execution node");
            continue;
        }

        nodes.push(parse_node(key, raw, templates, schema)?);
    }

    Ok(nodes)
}

fn parse_node(
    key: &str,
    raw: RawNode,
    templates: &HashMap<&str, &RawTemplate>,
    schema: &ManifestSchema,
) -> Result<ExecutionNode> {
    let template_name = raw
        .template_name
        .ok_or_else(|| Error::missing(format!("status.nodes.{}.templateName", key)))?;

    let template = templates
        .get(template_name.as_str())
        .copied()
        .ok_or_else(|| Error::UnknownTemplate {
            node_id: key.to_string(),
            template: template_name.clone(),
        })?;

    let raw_display = raw
        .display_name
        .ok_or_else(|| Error::missing(format!("status.nodes.{}.displayName", key)))?;

    let display_name = schema
        .display_name_annotation
        .as_ref()
        .and_then(|annotation| template.metadata.annotations.get(annotation))
        .cloned()
        .unwrap_or(raw_display);

    let timing = Timing::observed(
        parse_optional(raw.started_at.as_deref())?,
        parse_optional(raw.finished_at.as_deref())?,
    )?;

    let declared = declared_types(template, schema)?;
    let artifacts = raw
        .outputs
        .map(|outputs| outputs.artifacts)
        .unwrap_or_default()
        .into_iter()
        .map(|artifact| {
            let template_path = template
                .outputs
                .artifacts
                .iter()
                .find(|t| t.name == artifact.name)
                .and_then(|t| t.path.clone());
            ArtifactDescriptor {
                declared_type: declared.get(&artifact.name).copied(),
                path: artifact.path.or(template_path),
                name: artifact.name,
            }
        })
        .collect();

    let flags = classify(raw.phase.as_deref(), &schema.tokens);

    Ok(ExecutionNode {
        id: raw.id.unwrap_or_else(|| key.to_string()),
        display_name,
        template_name: Some(template_name),
        status: raw.phase,
        flags,
        timing,
        message: raw.message,
        artifacts,
    })
}

/// Output types declared in the template's component spec
///
/// The spec lists outputs in the same order as the template's output
/// artifacts; the two are paired positionally.
fn declared_types(
    template: &RawTemplate,
    schema: &ManifestSchema,
) -> Result<HashMap<String, OutputType>> {
    let Some(spec_json) = schema
        .component_spec_annotation
        .as_ref()
        .and_then(|annotation| template.metadata.annotations.get(annotation))
    else {
        return Ok(HashMap::new());
    };

    let spec: ComponentSpec = serde_json::from_str(spec_json).map_err(|e| {
        Error::missing(format!(
            "spec.templates.{}: malformed component spec: {}",
            template.name, e
        ))
    })?;

    Ok(template
        .outputs
        .artifacts
        .iter()
        .zip(spec.outputs.iter())
        .filter_map(|(artifact, output)| {
            let type_name = output.output_type.as_ref()?.as_str()?;
            OutputType::from_spec(type_name).map(|t| (artifact.name.clone(), t))
        })
        .collect())
}
