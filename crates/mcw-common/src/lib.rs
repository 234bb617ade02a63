//! # MCW Common
//!
//! Common types and errors shared across the MCW workspace.
//!
//! This crate provides the foundational pieces every other crate builds on:
//! the launcher error taxonomy, the process-level error type, and the core
//! domain types (server versions, build numbers, termination signals).

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{LaunchError, LaunchResult, ProcessError, ProcessResult, RemoteEndpoint};
pub use types::{BuildNumber, ServerVersion, TerminationSignal};
