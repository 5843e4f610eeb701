//! Runlens Core
//!
//! Read-only accessors over pipeline run manifests.
//!
//! This crate contains:
//! - Domain types: RunManifest, ExecutionNode and the status/timing helpers they share
//! - Parsers: workflow manifest (v1 API) and run task details (v2 API) into the domain model
//! - Artifact retrieval through an injected fetcher
//! - DOT export of the full workflow node graph
//! - DTOs: documents returned by the platform API, plus a dump helper for debugging

pub mod artifact;
pub mod domain;
pub mod dto;
pub mod dump;
pub mod error;
pub mod graph;
pub mod parser;
pub mod schema;

pub use artifact::{ArtifactFetcher, FetchError, Payload, PayloadKind};
pub use domain::node::{ArtifactDescriptor, ExecutionNode, OutputType, OutputValue};
pub use domain::run::RunManifest;
pub use domain::status::{StatusFlags, StatusTokens, classify};
pub use domain::timing::{Timing, parse_timestamp};
pub use error::{Error, Result};
pub use graph::workflow_dot;
pub use schema::ManifestSchema;

#[cfg(test)]
pub(crate) mod fixtures;
