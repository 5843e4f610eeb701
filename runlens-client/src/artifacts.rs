//! Artifact-related API endpoints

use async_trait::async_trait;
use runlens_core::dto::artifact::ReadArtifact;
use runlens_core::{ArtifactFetcher, FetchError};

use crate::PlatformClient;
use crate::error::Result;

impl PlatformClient {
    // =============================================================================
    // Artifacts
    // =============================================================================

    /// Read one artifact of a run node
    ///
    /// # Returns
    /// The artifact content as base64 text
    pub async fn read_artifact(&self, run_id: &str, node_id: &str, artifact_name: &str) -> Result<String> {
        let url = format!(
            "{}/apis/v1beta1/runs/{}/nodes/{}/artifacts/{}:read",
            self.base_url, run_id, node_id, artifact_name
        );
        let response = self.client.get(&url).send().await?;

        let body: ReadArtifact = self.handle_response(response).await?;
        Ok(body.data)
    }
}

#[async_trait]
impl ArtifactFetcher for PlatformClient {
    async fn read_artifact(
        &self,
        run_id: &str,
        node_id: &str,
        artifact_name: &str,
    ) -> std::result::Result<String, FetchError> {
        PlatformClient::read_artifact(self, run_id, node_id, artifact_name)
            .await
            .map_err(|e| Box::new(e) as FetchError)
    }
}
