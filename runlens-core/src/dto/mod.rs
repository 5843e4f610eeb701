//! Data Transfer Objects for the platform API
//!
//! This module contains the documents returned by the pipeline platform's
//! REST API. Manifests arrive as JSON strings embedded in these documents;
//! helpers here parse them into `serde_json::Value` for the parsers.

pub mod artifact;
pub mod run;
