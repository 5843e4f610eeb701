//! Configuration module
//!
//! Handles CLI configuration including the platform URL, the manifest
//! flavour of offline files and polling settings.

use anyhow::bail;
use clap::ValueEnum;
use runlens_client::WaitOptions;
use runlens_core::ManifestSchema;
use std::time::Duration;

/// Flavour of a workflow manifest read from disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaKind {
    /// Workflow manifest embedded in a platform run
    KfpV1,
    /// Plain workflow object read from the cluster
    Argo,
}

impl SchemaKind {
    pub fn schema(self) -> ManifestSchema {
        match self {
            SchemaKind::KfpV1 => ManifestSchema::kfp_v1(),
            SchemaKind::Argo => ManifestSchema::argo(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the pipeline platform API
    pub platform_url: String,
}

impl Config {
    pub fn new(platform_url: impl Into<String>) -> Self {
        Self {
            platform_url: platform_url.into(),
        }
    }

    /// Schema of the manifests embedded in platform runs
    ///
    /// Always the platform's own flavour: its run id label is what the
    /// artifact endpoints expect.
    pub fn platform_schema(&self) -> ManifestSchema {
        ManifestSchema::kfp_v1()
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.platform_url.is_empty() {
            bail!("platform_url cannot be empty");
        }

        if !self.platform_url.starts_with("http://") && !self.platform_url.starts_with("https://") {
            bail!("platform_url must start with http:// or https://");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("http://localhost:8888")
    }
}

/// Build and check the polling settings of `run watch`
pub fn wait_options(interval_ms: u64, timeout_secs: u64) -> anyhow::Result<WaitOptions> {
    if interval_ms == 0 {
        bail!("poll interval must be greater than 0");
    }
    if timeout_secs == 0 {
        bail!("timeout must be greater than 0");
    }

    Ok(WaitOptions {
        poll_interval: Duration::from_millis(interval_ms),
        timeout: Duration::from_secs(timeout_secs),
    })
}
