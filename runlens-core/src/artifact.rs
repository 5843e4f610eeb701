//! Log and artifact retrieval
//!
//! Payloads are pulled through an injected `ArtifactFetcher` (normally the
//! platform client). The platform hands back base64 text; output artifacts
//! are additionally tar archives, gzip-compressed or not.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use tracing::{debug, info};

use crate::domain::node::{ExecutionNode, OutputType, OutputValue};
use crate::domain::run::RunManifest;
use crate::error::{Error, Result};

/// Error returned by a fetcher implementation
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Archive member holding a component output value
const DATA_MEMBER: &str = "data";

/// Capability to read a node artifact from the platform
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Read one artifact of one node
    ///
    /// # Returns
    /// The artifact payload as base64 text
    async fn read_artifact(
        &self,
        run_id: &str,
        node_id: &str,
        artifact_name: &str,
    ) -> std::result::Result<String, FetchError>;
}

/// How a fetched payload should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Decoded bytes are UTF-8 text (logs)
    Text,
    /// Decoded bytes are a tar archive of UTF-8 members (outputs)
    Archive,
}

/// A decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Archive(BTreeMap<String, String>),
}

/// Decode a base64 payload
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    Ok(BASE64.decode(encoded.trim())?)
}

/// Unpack a tar archive held in memory into member name → text
///
/// Gzip-compressed archives are detected by their magic bytes.
pub fn unpack_archive(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        let mut inflated = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut inflated)
            .map_err(Error::Archive)?;
        return read_tar(&inflated);
    }

    read_tar(bytes)
}

fn read_tar(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    let mut archive = tar::Archive::new(Cursor::new(bytes));
    let mut members = BTreeMap::new();

    for entry in archive.entries().map_err(Error::Archive)? {
        let mut entry = entry.map_err(Error::Archive)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let name = entry
            .path()
            .map_err(Error::Archive)?
            .to_string_lossy()
            .into_owned();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).map_err(Error::Archive)?;

        members.insert(name, String::from_utf8(content)?);
    }

    Ok(members)
}

/// Coerce an output's text to its declared type
pub fn coerce_output(name: &str, text: &str, declared: OutputType) -> Result<OutputValue> {
    let coercion_error = |reason: String| Error::Coercion {
        name: name.to_string(),
        declared: declared.to_string(),
        reason,
    };

    match declared {
        OutputType::Integer => text
            .trim()
            .parse::<i64>()
            .map(OutputValue::Integer)
            .map_err(|e| coercion_error(e.to_string())),
        OutputType::Float => text
            .trim()
            .parse::<f64>()
            .map(OutputValue::Float)
            .map_err(|e| coercion_error(e.to_string())),
        OutputType::Boolean => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(OutputValue::Boolean(true)),
            "false" => Ok(OutputValue::Boolean(false)),
            other => Err(coercion_error(format!("'{}' is not a boolean", other))),
        },
        OutputType::String => Ok(OutputValue::String(text.to_string())),
        OutputType::JsonObject => serde_json::from_str(text)
            .map(OutputValue::Json)
            .map_err(|e| coercion_error(e.to_string())),
    }
}

impl RunManifest {
    /// Fetch and decode one artifact of a node
    ///
    /// # Errors
    /// Fails without fetching when the artifact is not declared on the node
    /// or when no fetcher is attached.
    pub async fn pull_raw(
        &self,
        node: &ExecutionNode,
        artifact_name: &str,
        kind: PayloadKind,
    ) -> Result<Payload> {
        let bytes = self.fetch_bytes(node, artifact_name).await?;

        match kind {
            PayloadKind::Text => Ok(Payload::Text(String::from_utf8(bytes)?)),
            PayloadKind::Archive => Ok(Payload::Archive(unpack_archive(&bytes)?)),
        }
    }

    /// Container logs of a node
    pub async fn pull_logs(&self, node: &ExecutionNode) -> Result<String> {
        let bytes = self.fetch_bytes(node, &self.schema().log_artifact).await?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Members of an archived output artifact
    pub async fn pull_artifact(
        &self,
        node: &ExecutionNode,
        artifact_name: &str,
    ) -> Result<BTreeMap<String, String>> {
        let bytes = self.fetch_bytes(node, artifact_name).await?;
        unpack_archive(&bytes)
    }

    async fn fetch_bytes(&self, node: &ExecutionNode, artifact_name: &str) -> Result<Vec<u8>> {
        if node.artifact(artifact_name).is_none() {
            return Err(Error::UndeclaredArtifact {
                node_id: node.id.clone(),
                name: artifact_name.to_string(),
                declared: node.artifact_names(),
            });
        }

        let fetcher = self.fetcher().ok_or(Error::NoFetcher)?;

        debug!(
            run_id = %self.run_id(),
            node_id = %node.id,
            artifact = artifact_name,
            "Reading artifact"
        );
        let encoded = fetcher
            .read_artifact(self.run_id(), &node.id, artifact_name)
            .await
            .map_err(Error::Fetch)?;

        decode_payload(&encoded)
    }

    /// All typed outputs of a node, coerced to their declared types
    ///
    /// Artifacts without a declared type (logs, untyped files) are skipped.
    /// With `normalize`, the `"{template}-"` prefix the engine adds to
    /// output names is stripped from the keys.
    pub async fn pull_outputs(
        &self,
        node: &ExecutionNode,
        normalize: bool,
    ) -> Result<BTreeMap<String, OutputValue>> {
        let mut outputs = BTreeMap::new();

        for artifact in &node.artifacts {
            let Some(declared) = artifact.declared_type else {
                continue;
            };

            let members = self.pull_artifact(node, &artifact.name).await?;
            let text = data_member(&artifact.name, &members)?;
            let value = coerce_output(&artifact.name, text, declared)?;

            let key = match (&node.template_name, normalize) {
                (Some(template), true) => artifact
                    .name
                    .strip_prefix(&format!("{}-", template))
                    .unwrap_or(&artifact.name)
                    .to_string(),
                _ => artifact.name.clone(),
            };
            outputs.insert(key, value);
        }

        info!(node_id = %node.id, outputs = outputs.len(), "Pulled node outputs");
        Ok(outputs)
    }
}

/// The member holding an output value: `data`, or the only member
fn data_member<'a>(name: &str, members: &'a BTreeMap<String, String>) -> Result<&'a str> {
    if let Some(text) = members.get(DATA_MEMBER) {
        return Ok(text);
    }

    match members.values().collect::<Vec<_>>().as_slice() {
        [only] => Ok(only.as_str()),
        _ => Err(Error::MissingDataMember(name.to_string())),
    }
}
