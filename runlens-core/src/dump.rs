//! Manifest dump
//!
//! Debugging aid: writes the runtime and submission-time manifests of a run
//! to disk as pretty-printed JSON.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dto::run::RunDetail;
use crate::error::{Error, Result};

/// Files written by `dump_manifests`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPaths {
    pub runtime: PathBuf,
    pub spec: PathBuf,
}

/// Write `{name}.pipeline_runtime.workflow_manifest.json` and
/// `{name}.pipeline_spec.workflow_manifest.json` into `dir`
pub fn dump_manifests(dir: &Path, name: &str, detail: &RunDetail) -> Result<DumpPaths> {
    let spec = &detail.run.pipeline_spec;
    if spec.pipeline_manifest.is_some() {
        return Err(Error::Unsupported(
            "pipeline spec carries a pipeline manifest, dumping it is not implemented".to_string(),
        ));
    }
    if spec.runtime_config.is_some() {
        return Err(Error::Unsupported(
            "pipeline spec carries a runtime config, dumping it is not implemented".to_string(),
        ));
    }

    let runtime_path = dir.join(format!("{}.pipeline_runtime.workflow_manifest.json", name));
    info!("Writing pipeline runtime to {}", runtime_path.display());
    write_pretty(&runtime_path, &detail.runtime_manifest()?)?;

    let spec_path = dir.join(format!("{}.pipeline_spec.workflow_manifest.json", name));
    info!("Writing pipeline spec to {}", spec_path.display());
    write_pretty(&spec_path, &detail.run.spec_manifest()?)?;

    Ok(DumpPaths {
        runtime: runtime_path,
        spec: spec_path,
    })
}

fn write_pretty(path: &Path, value: &serde_json::Value) -> Result<()> {
    // serde_json's pretty printer indents with two spaces
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}
