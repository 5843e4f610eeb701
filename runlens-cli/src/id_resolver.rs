//! ID resolver module
//!
//! Resolves run id prefixes to full run ids by listing runs on the platform.
//! This allows users to specify short, unambiguous prefixes instead of full UUIDs.

use anyhow::{Context, Result, anyhow};
use runlens_client::PlatformClient;
use runlens_core::dto::run::ApiRun;
use tracing::debug;

use crate::types::IdOrPrefix;

/// Runs fetched per page while resolving a prefix
const PAGE_SIZE: u32 = 100;

/// Resolve a run ID or prefix to a full run id
///
/// If the input is already a full UUID, returns it immediately.
/// Otherwise, pages through the run list and finds the one matching the prefix.
///
/// # Errors
/// Returns an error if:
/// - No run matches the prefix
/// - Multiple runs match the prefix (ambiguous)
/// - API call fails
pub async fn resolve_run_id(client: &PlatformClient, id_or_prefix: &IdOrPrefix) -> Result<String> {
    if let IdOrPrefix::Full(uuid) = id_or_prefix {
        return Ok(uuid.to_string());
    }

    let mut runs = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page = client
            .list_runs(PAGE_SIZE, page_token.as_deref())
            .await
            .context("Failed to fetch runs for ID resolution")?;
        runs.extend(page.runs);

        if page.next_page_token.is_empty() {
            break;
        }
        page_token = Some(page.next_page_token);
    }

    let run_id = pick_match(&runs, id_or_prefix)?;
    debug!(prefix = %id_or_prefix, run_id = %run_id, "Resolved run id");
    Ok(run_id)
}

fn pick_match(runs: &[ApiRun], id_or_prefix: &IdOrPrefix) -> Result<String> {
    let matches: Vec<&ApiRun> = runs.iter().filter(|r| id_or_prefix.matches(&r.id)).collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No run found with ID starting with '{}'", id_or_prefix)),
        [run] => Ok(run.id.clone()),
        _ => {
            let ids: Vec<&str> = matches.iter().map(|r| r.id.as_str()).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple runs: {}",
                id_or_prefix,
                ids.join(", ")
            ))
        }
    }
}
