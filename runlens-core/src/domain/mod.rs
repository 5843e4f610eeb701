//! Core domain types
//!
//! This module contains the read-only view of a pipeline run built from a
//! manifest snapshot. Runs and nodes share the same status classification
//! and timing helpers instead of each carrying their own copy.

pub mod node;
pub mod record;
pub mod run;
pub mod status;
pub mod timing;
