//! Run-related API endpoints

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::PlatformClient;
use crate::error::{ClientError, Result};
use runlens_core::dto::run::{ListRuns, RunDetail};
use runlens_core::{ManifestSchema, RunManifest};

/// Polling behaviour of `wait_for_completion`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Delay between two snapshots
    pub poll_interval: Duration,
    /// Give up after this long
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PlatformClient {
    // =============================================================================
    // Runs
    // =============================================================================

    /// Get a run and its live workflow manifest
    pub async fn get_run(&self, run_id: &str) -> Result<RunDetail> {
        let url = format!("{}/apis/v1beta1/runs/{}", self.base_url, run_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List one page of runs, newest first
    ///
    /// # Arguments
    /// * `page_size` - Maximum number of runs returned
    /// * `page_token` - Token from a previous page, if any
    pub async fn list_runs(&self, page_size: u32, page_token: Option<&str>) -> Result<ListRuns> {
        let url = format!("{}/apis/v1beta1/runs", self.base_url);
        let mut query = vec![
            ("page_size", page_size.to_string()),
            ("sort_by", "created_at desc".to_string()),
        ];
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            query.push(("page_token", token.to_string()));
        }
        let response = self.client.get(&url).query(&query).send().await?;

        self.handle_response(response).await
    }

    /// Get a run document from the v2 API
    pub async fn get_run_v2(&self, run_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/apis/v2beta1/runs/{}", self.base_url, run_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Snapshots
    // =============================================================================

    /// Take a snapshot of a run
    ///
    /// The returned view reads artifacts back through this client.
    pub async fn fetch_manifest(&self, run_id: &str, schema: &ManifestSchema) -> Result<RunManifest> {
        let detail = self.get_run(run_id).await?;
        self.snapshot(&detail, schema)
    }

    /// Take a snapshot of a run through the v2 API
    pub async fn fetch_manifest_v2(&self, run_id: &str) -> Result<RunManifest> {
        let document = self.get_run_v2(run_id).await?;
        let manifest = RunManifest::from_v2_run(&document)?;
        Ok(manifest.with_fetcher(Arc::new(self.clone())))
    }

    fn snapshot(&self, detail: &RunDetail, schema: &ManifestSchema) -> Result<RunManifest> {
        let manifest = RunManifest::from_run_detail(detail, schema)?;
        Ok(manifest.with_fetcher(Arc::new(self.clone())))
    }

    /// Poll a run until it and every node in it have finished
    ///
    /// `on_snapshot` sees every snapshot taken, including the final one.
    /// Polls where the workflow has not been created yet are skipped.
    pub async fn wait_for_completion<F>(
        &self,
        run_id: &str,
        schema: &ManifestSchema,
        options: &WaitOptions,
        mut on_snapshot: F,
    ) -> Result<RunManifest>
    where
        F: FnMut(&RunManifest),
    {
        let started = Instant::now();
        info!("Waiting for run {} to finish", run_id);

        loop {
            let detail = self.get_run(run_id).await?;

            if detail.has_runtime_manifest() {
                let manifest = self.snapshot(&detail, schema)?;
                on_snapshot(&manifest);
                if manifest.all_finished() {
                    info!("Run {} finished after {:?}", run_id, started.elapsed());
                    return Ok(manifest);
                }
            } else {
                debug!("Run {} has no workflow yet", run_id);
            }

            if started.elapsed() >= options.timeout {
                return Err(ClientError::Timeout {
                    run_id: run_id.to_string(),
                    waited: options.timeout,
                });
            }
            sleep(options.poll_interval).await;
        }
    }
}
