//! Manifest fixtures shared by unit tests

use serde_json::{Map, Value, json};

/// Build a workflow manifest with the given status block, nodes and templates
pub fn workflow(status: Value, nodes: Vec<(String, Value)>, templates: Vec<Value>) -> Value {
    let mut status = status;
    let mut map = Map::new();
    for (id, node) in nodes {
        map.insert(id, node);
    }
    status["nodes"] = Value::Object(map);

    json!({
        "metadata": {
            "name": "fixture-wf-x7k2p",
            "uid": "5c1c0d43-uid",
            "labels": {
                "pipeline/runid": "run-123",
                "workflows.argoproj.io/phase": status["phase"].clone()
            },
            "annotations": {
                "pipelines.kubeflow.org/run_name": "fixture-run"
            }
        },
        "spec": { "templates": templates },
        "status": status
    })
}

/// A pod node started at midnight; terminal phases finish five seconds later
pub fn pod(id: &str, template: &str, display: &str, phase: &str) -> (String, Value) {
    let finished = match phase {
        "Succeeded" | "Failed" | "Skipped" => Some("2024-01-01T00:00:05Z"),
        _ => None,
    };
    pod_timed(id, template, display, phase, Some("2024-01-01T00:00:00Z"), finished)
}

pub fn pod_timed(
    id: &str,
    template: &str,
    display: &str,
    phase: &str,
    started_at: Option<&str>,
    finished_at: Option<&str>,
) -> (String, Value) {
    (
        id.to_string(),
        json!({
            "id": id,
            "name": format!("fixture-wf-x7k2p.{}", template),
            "type": "Pod",
            "templateName": template,
            "displayName": display,
            "phase": phase,
            "startedAt": started_at,
            "finishedAt": finished_at,
            "outputs": {
                "artifacts": [
                    { "name": "main-logs", "s3": { "key": format!("artifacts/{}/main.log", id) } }
                ]
            }
        }),
    )
}

/// A control-construct node (DAG, TaskGroup, ...) that the index drops
pub fn group(id: &str, node_type: &str, display: &str) -> (String, Value) {
    (
        id.to_string(),
        json!({
            "id": id,
            "type": node_type,
            "templateName": "not-a-template",
            "displayName": display,
            "phase": "Succeeded",
            "startedAt": "2024-01-01T00:00:00Z",
            "finishedAt": "2024-01-01T00:00:09Z"
        }),
    )
}

/// A template, optionally overriding its task display name
pub fn template(name: &str, display_override: Option<&str>) -> Value {
    let mut annotations = Map::new();
    if let Some(display) = display_override {
        annotations.insert(
            "pipelines.kubeflow.org/task_display_name".to_string(),
            Value::String(display.to_string()),
        );
    }

    json!({
        "name": name,
        "metadata": { "annotations": annotations },
        "outputs": { "artifacts": [] }
    })
}

/// A template with typed outputs declared through its component spec
pub fn template_with_outputs(name: &str, outputs: &[(&str, &str)]) -> Value {
    let spec_outputs: Vec<Value> = outputs
        .iter()
        .map(|(output, ty)| json!({ "name": output, "type": ty }))
        .collect();
    let artifacts: Vec<Value> = outputs
        .iter()
        .map(|(output, _)| {
            json!({
                "name": format!("{}-{}", name, output.to_lowercase()),
                "path": format!("/tmp/outputs/{}/data", output)
            })
        })
        .collect();
    let component_spec = json!({ "name": name, "outputs": spec_outputs }).to_string();

    json!({
        "name": name,
        "metadata": {
            "annotations": { "pipelines.kubeflow.org/component_spec": component_spec }
        },
        "outputs": { "artifacts": artifacts }
    })
}

/// A succeeded pod whose outputs match `template_with_outputs`
pub fn pod_with_outputs(id: &str, template: &str, outputs: &[&str]) -> (String, Value) {
    let (id, mut node) = pod(id, template, template, "Succeeded");
    let mut artifacts: Vec<Value> = outputs
        .iter()
        .map(|output| json!({ "name": format!("{}-{}", template, output.to_lowercase()) }))
        .collect();
    artifacts.push(json!({ "name": "main-logs" }));
    node["outputs"]["artifacts"] = Value::Array(artifacts);
    (id, node)
}
