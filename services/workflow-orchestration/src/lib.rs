//! Gazette Workflow
//!
//! Wires retrieval, extraction and notification into a single run.

pub mod service;

pub use service::{GazetteWorkflow, RunOutcome};
