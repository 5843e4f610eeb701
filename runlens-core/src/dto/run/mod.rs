//! Run DTOs returned by the v1 API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A run together with its live workflow manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDetail {
    pub run: ApiRun,
    #[serde(default)]
    pub pipeline_runtime: PipelineRuntime,
}

impl RunDetail {
    /// The workflow has been created and reports a runtime manifest
    pub fn has_runtime_manifest(&self) -> bool {
        !self.pipeline_runtime.workflow_manifest.trim().is_empty()
    }

    /// The runtime workflow manifest, parsed
    pub fn runtime_manifest(&self) -> Result<Value> {
        parse_embedded("pipeline_runtime.workflow_manifest", &self.pipeline_runtime.workflow_manifest)
    }
}

/// Run record as submitted and summarised by the platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiRun {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pipeline_spec: PipelineSpec,
}

impl ApiRun {
    /// The submission-time workflow manifest, parsed
    pub fn spec_manifest(&self) -> Result<Value> {
        parse_embedded("run.pipeline_spec.workflow_manifest", &self.pipeline_spec.workflow_manifest)
    }
}

/// Runtime section of a run detail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineRuntime {
    /// Workflow manifest JSON, empty before the workflow exists
    #[serde(default)]
    pub workflow_manifest: String,
    #[serde(default)]
    pub pipeline_manifest: Option<String>,
}

/// Pipeline spec attached to a run at submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub pipeline_id: Option<String>,
    #[serde(default)]
    pub pipeline_name: Option<String>,
    #[serde(default)]
    pub workflow_manifest: String,
    #[serde(default)]
    pub pipeline_manifest: Option<String>,
    #[serde(default)]
    pub runtime_config: Option<Value>,
}

/// One page of runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRuns {
    #[serde(default)]
    pub runs: Vec<ApiRun>,
    #[serde(default)]
    pub total_size: i64,
    #[serde(default)]
    pub next_page_token: String,
}

fn parse_embedded(field: &str, json: &str) -> Result<Value> {
    if json.trim().is_empty() {
        return Err(Error::missing(field));
    }
    Ok(serde_json::from_str(json)?)
}
