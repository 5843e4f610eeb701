//! Artifact DTOs

use serde::{Deserialize, Serialize};

/// Response of the read-artifact endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadArtifact {
    /// Base64-encoded artifact content
    #[serde(default)]
    pub data: String,
}
