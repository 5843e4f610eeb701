//! v2 run parser
//!
//! The v2 API reports a run as a list of task details rather than a
//! workflow manifest. Tasks map onto the same `ExecutionNode` model; they
//! carry no templates or declared artifacts.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::node::ExecutionNode;
use crate::domain::run::{RunManifest, RunParts};
use crate::domain::status::classify;
use crate::domain::timing::{Timing, parse_timestamp};
use crate::error::{Error, Result};
use crate::schema::ManifestSchema;

/// Display name of the task wrapping the whole pipeline
const ROOT_TASK: &str = "root";

#[derive(Debug, Deserialize)]
struct RawRun {
    run_id: Option<String>,
    display_name: Option<String>,
    state: Option<String>,
    created_at: Option<String>,
    finished_at: Option<String>,
    run_details: Option<RawRunDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRunDetails {
    #[serde(default)]
    task_details: Vec<RawTask>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    task_id: Option<String>,
    display_name: Option<String>,
    state: Option<String>,
    create_time: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    error: Option<RawStatusMessage>,
    #[serde(default)]
    child_tasks: Vec<RawChildTask>,
}

#[derive(Debug, Deserialize)]
struct RawStatusMessage {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawChildTask {
    pod_name: Option<String>,
}

/// Parse a v2 timestamp; the API reports unset times as the Unix epoch
fn parse_v2_time(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let parsed = parse_timestamp(value)?;
    if parsed.timestamp() == 0 && parsed.timestamp_subsec_nanos() == 0 {
        return Ok(None);
    }
    Ok(Some(parsed))
}

impl RunManifest {
    /// Build a view from a v2 API run document
    pub fn from_v2_run(document: &Value) -> Result<Self> {
        let raw = RawRun::deserialize(document).map_err(|e| Error::missing(format!("run: {}", e)))?;
        let schema = ManifestSchema::kfp_v2();

        let run_id = raw.run_id.ok_or_else(|| Error::missing("run_id"))?;
        let run_name = raw.display_name.ok_or_else(|| Error::missing("display_name"))?;

        let timing = Timing::new(
            parse_v2_time(raw.created_at.as_deref())?,
            parse_v2_time(raw.finished_at.as_deref())?,
        )?;

        // Null until the backend has scheduled anything
        let tasks = raw.run_details.unwrap_or_default().task_details;
        let workflow_name = workflow_name(&tasks)?;

        let mut nodes = Vec::with_capacity(tasks.len());
        for (position, task) in tasks.into_iter().enumerate() {
            let id = task
                .task_id
                .ok_or_else(|| Error::missing(format!("task_details[{}].task_id", position)))?;
            let display_name = task.display_name.ok_or_else(|| {
                Error::missing(format!("task_details[{}].display_name", position))
            })?;

            let started_at = match parse_v2_time(task.start_time.as_deref())? {
                Some(start) => Some(start),
                None => parse_v2_time(task.create_time.as_deref())?,
            };
            let timing = Timing::observed(started_at, parse_v2_time(task.end_time.as_deref())?)?;

            nodes.push(ExecutionNode {
                id,
                display_name,
                template_name: None,
                flags: classify(task.state.as_deref(), &schema.tokens),
                status: task.state,
                timing,
                message: task.error.and_then(|e| e.message),
                artifacts: Vec::new(),
            });
        }

        debug!(run_id = %run_id, tasks = nodes.len(), "Parsed v2 run");

        RunManifest::assemble(RunParts {
            run_id,
            run_name,
            workflow_name,
            status: raw.state,
            timing,
            nodes,
            schema,
        })
    }
}

/// Derive the workflow name from the first pod launched under the root task
///
/// The v2 API does not report the workflow name, but pod names are the
/// workflow name plus a generated suffix.
fn workflow_name(tasks: &[RawTask]) -> Result<Option<String>> {
    let roots: Vec<&RawTask> = tasks
        .iter()
        .filter(|t| t.display_name.as_deref() == Some(ROOT_TASK))
        .collect();

    let root = match roots.as_slice() {
        [] => return Ok(None),
        [root] => *root,
        _ => {
            return Err(Error::Inconsistent(format!(
                "expected a single root task, found {}",
                roots.len()
            )));
        }
    };

    Ok(root
        .child_tasks
        .first()
        .and_then(|child| child.pod_name.as_deref())
        .and_then(|pod| pod.rsplit_once('-'))
        .map(|(name, _)| name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_doc(state: &str, tasks: Value) -> Value {
        json!({
            "run_id": "9b1f-run",
            "display_name": "single no-op",
            "state": state,
            "created_at": "2024-01-01T00:00:00Z",
            "scheduled_at": "1970-01-01T00:00:00Z",
            "finished_at": "1970-01-01T00:00:00Z",
            "run_details": { "task_details": tasks }
        })
    }

    fn task(id: &str, name: &str, state: &str) -> Value {
        json!({
            "task_id": id,
            "display_name": name,
            "state": state,
            "create_time": "2024-01-01T00:00:01Z",
            "start_time": "2024-01-01T00:00:02Z",
            "end_time": "1970-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_parse_tasks() {
        let doc = run_doc(
            "RUNNING",
            json!([task("t1", "root", "RUNNING"), task("t2", "no-op", "PENDING")]),
        );

        let run = RunManifest::from_v2_run(&doc).unwrap();
        assert_eq!(run.run_id(), "9b1f-run");
        assert!(run.running());
        assert_eq!(run.finished_at(), None);
        assert_eq!(run.len(), 2);
        assert!(run.node("t2").unwrap().pending());
        assert_eq!(run.get_nodes("no-op").len(), 1);
    }

    #[test]
    fn test_null_run_details_is_empty() {
        let mut doc = run_doc("PENDING", json!([]));
        doc["run_details"] = Value::Null;
        let run = RunManifest::from_v2_run(&doc).unwrap();
        assert!(run.is_empty());
        assert_eq!(run.workflow_name(), None);
    }

    #[test]
    fn test_all_finished_uses_v2_tokens() {
        let mut doc = run_doc(
            "SUCCEEDED",
            json!([task("t1", "root", "SUCCEEDED"), task("t2", "no-op", "RUNNING")]),
        );
        doc["finished_at"] = json!("2024-01-01T00:00:30Z");

        let run = RunManifest::from_v2_run(&doc).unwrap();
        assert!(run.finished());
        assert!(!run.all_finished());
        assert_eq!(run.duration(), chrono::TimeDelta::seconds(30));
    }

    #[test]
    fn test_workflow_name_from_root_child_pod() {
        let mut root = task("t1", "root", "RUNNING");
        root["child_tasks"] = json!([{ "task_id": "t2", "pod_name": "single-no-op-x9z8q-1234567" }]);
        let doc = run_doc("RUNNING", json!([root, task("t2", "no-op", "RUNNING")]));

        let run = RunManifest::from_v2_run(&doc).unwrap();
        assert_eq!(run.workflow_name(), Some("single-no-op-x9z8q"));
    }

    #[test]
    fn test_multiple_roots_is_inconsistent() {
        let doc = run_doc(
            "RUNNING",
            json!([task("t1", "root", "RUNNING"), task("t2", "root", "RUNNING")]),
        );
        let err = RunManifest::from_v2_run(&doc).unwrap_err();
        assert!(err.is_schema_inconsistency());
    }

    #[test]
    fn test_task_start_falls_back_to_create_time() {
        let mut t = task("t1", "no-op", "SKIPPED");
        t["start_time"] = json!("1970-01-01T00:00:00Z");
        t["end_time"] = json!("2024-01-01T00:00:04Z");
        let doc = run_doc("RUNNING", json!([t]));

        let run = RunManifest::from_v2_run(&doc).unwrap();
        let node = run.node("t1").unwrap();
        assert!(node.skipped());
        assert_eq!(node.duration(), chrono::TimeDelta::seconds(3));
    }
}
