//! Manifest schema
//!
//! Field mapping for the manifest flavours this crate reads. Each platform
//! version names the same facts differently; the parser takes one of these
//! instead of hard-coding keys.

use serde::{Deserialize, Serialize};

use crate::domain::status::StatusTokens;

/// Annotation carrying an author-supplied task display name
pub const TASK_DISPLAY_NAME_ANNOTATION: &str = "pipelines.kubeflow.org/task_display_name";

/// Annotation carrying the component spec JSON of a template
pub const COMPONENT_SPEC_ANNOTATION: &str = "pipelines.kubeflow.org/component_spec";

/// Label carrying the platform run id
pub const RUN_ID_LABEL: &str = "pipeline/runid";

/// Annotation carrying the run display name
pub const RUN_NAME_ANNOTATION: &str = "pipelines.kubeflow.org/run_name";

/// Field mapping used by the manifest parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSchema {
    /// Node `type` marking an execution unit; other types are control constructs
    pub execution_node_type: String,

    /// Template annotation overriding a node's display name
    pub display_name_annotation: Option<String>,

    /// Template annotation holding the component spec (declared output types)
    pub component_spec_annotation: Option<String>,

    /// Metadata label holding the run id; `None` reads `metadata.uid`
    pub run_id_label: Option<String>,

    /// Metadata annotation holding the run name; `None` reads `metadata.name`
    pub run_name_annotation: Option<String>,

    /// Artifact holding a node's container logs
    pub log_artifact: String,

    pub tokens: StatusTokens,
}

impl ManifestSchema {
    /// Workflow manifest embedded in a v1 API run detail
    pub fn kfp_v1() -> Self {
        Self {
            execution_node_type: "Pod".to_string(),
            display_name_annotation: Some(TASK_DISPLAY_NAME_ANNOTATION.to_string()),
            component_spec_annotation: Some(COMPONENT_SPEC_ANNOTATION.to_string()),
            run_id_label: Some(RUN_ID_LABEL.to_string()),
            run_name_annotation: Some(RUN_NAME_ANNOTATION.to_string()),
            log_artifact: "main-logs".to_string(),
            tokens: StatusTokens::argo(),
        }
    }

    /// Run documents from the v2 API; only the status tokens differ
    pub fn kfp_v2() -> Self {
        Self {
            tokens: StatusTokens::kfp_v2(),
            ..Self::kfp_v1()
        }
    }

    /// Workflow object read straight from the cluster
    pub fn argo() -> Self {
        Self {
            execution_node_type: "Pod".to_string(),
            display_name_annotation: None,
            component_spec_annotation: None,
            run_id_label: None,
            run_name_annotation: None,
            log_artifact: "main-logs".to_string(),
            tokens: StatusTokens::argo(),
        }
    }
}

impl Default for ManifestSchema {
    fn default() -> Self {
        Self::kfp_v1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_kfp_v1() {
        let schema = ManifestSchema::default();
        assert_eq!(schema, ManifestSchema::kfp_v1());
        assert_eq!(schema.execution_node_type, "Pod");
        assert_eq!(schema.run_id_label.as_deref(), Some("pipeline/runid"));
    }

    #[test]
    fn test_argo_reads_metadata_directly() {
        let schema = ManifestSchema::argo();
        assert!(schema.display_name_annotation.is_none());
        assert!(schema.run_id_label.is_none());
        assert!(schema.run_name_annotation.is_none());
    }

    #[test]
    fn test_v2_uses_upper_case_tokens() {
        let schema = ManifestSchema::kfp_v2();
        assert_eq!(schema.tokens.succeeded, "SUCCEEDED");
        assert_eq!(schema.log_artifact, "main-logs");
    }
}
