//! Flat records for tabular export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::run::RunManifest;

/// Run-level columns repeated on every node record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub run_name: String,
    pub run_status: Option<String>,
    pub run_start: Option<DateTime<Utc>>,
    pub run_finish: Option<DateTime<Utc>>,
}

/// One row per execution node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub stage_name: String,
    pub node_id: String,
    pub status: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_seconds: f64,
    #[serde(flatten)]
    pub run: RunRecord,
}

impl RunManifest {
    pub fn to_record(&self) -> RunRecord {
        RunRecord {
            run_id: self.run_id().to_string(),
            run_name: self.run_name().to_string(),
            run_status: self.status().map(str::to_string),
            run_start: self.started_at(),
            run_finish: self.finished_at(),
        }
    }

    /// One record per node, in source order
    pub fn node_records(&self) -> Vec<NodeRecord> {
        let run = self.to_record();
        self.nodes()
            .iter()
            .map(|node| NodeRecord {
                stage_name: node.display_name.clone(),
                node_id: node.id.clone(),
                status: node.status.clone(),
                started_at: node.started_at(),
                finished_at: node.finished_at(),
                duration_seconds: node.duration().num_milliseconds() as f64 / 1000.0,
                run: run.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures;
    use crate::{ManifestSchema, RunManifest};
    use serde_json::json;

    #[test]
    fn test_node_records_flatten_run_columns() {
        let doc = fixtures::workflow(
            json!({ "phase": "Succeeded",
                    "startedAt": "2024-01-01T00:00:00Z",
                    "finishedAt": "2024-01-01T00:00:10Z" }),
            vec![
                fixtures::pod("wf-1", "a", "Sequential 1", "Succeeded"),
                fixtures::pod("wf-2", "b", "Sequential 2", "Succeeded"),
            ],
            vec![fixtures::template("a", None), fixtures::template("b", None)],
        );
        let run = RunManifest::from_value(&doc, &ManifestSchema::kfp_v1()).unwrap();

        let records = run.node_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].stage_name, "Sequential 1");
        assert_eq!(records[1].duration_seconds, 5.0);

        let row = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(row["run_id"], "run-123");
        assert_eq!(row["run_status"], "Succeeded");
        assert_eq!(row["node_id"], "wf-1");
    }
}
