//! Error types for the MCW workspace.
//!
//! Two layers of errors exist:
//!
//! - [`LaunchError`] is the session-level taxonomy. Every failure a session
//!   can hit (bad version input, remote metadata problems, local disk
//!   problems, process problems) ends up here so the binary can print one
//!   human-readable message and exit non-zero.
//! - [`ProcessError`] covers the supervisor and its state machine. It is
//!   folded into [`LaunchError::Process`] via `From`, so `?` works across
//!   the boundary.
//!
//! ```rust
//! use mcw_common::{LaunchError, LaunchResult, ServerVersion};
//!
//! fn pick(input: &str) -> LaunchResult<ServerVersion> {
//!     let version = input.parse::<ServerVersion>()?;
//!     Ok(version)
//! }
//!
//! assert!(matches!(pick("1.x"), Err(LaunchError::InvalidVersion { .. })));
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for session-level operations.
pub type LaunchResult<T> = std::result::Result<T, LaunchError>;

/// Which of the two remote endpoints produced a failure.
///
/// The metadata request and the artifact request fail independently, and
/// callers report them differently ("version unknown" vs "download
/// unavailable").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEndpoint {
    /// `GET .../versions/{version}/builds`
    Metadata,
    /// `GET .../versions/{version}/builds/{build}/downloads/{artifact}`
    Artifact,
}

impl fmt::Display for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteEndpoint::Metadata => write!(f, "build metadata"),
            RemoteEndpoint::Artifact => write!(f, "artifact download"),
        }
    }
}

/// Session-level error taxonomy.
///
/// None of these are retried automatically. Transient network failures
/// surface straight to the caller.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Malformed version string. Always detected before any I/O.
    #[error("Invalid version format: '{input}' (expected major.minor[.patch])")]
    InvalidVersion { input: String },

    /// The remote has no builds for this version.
    #[error("Version {version} not found: {reason}")]
    NotFound { version: String, reason: String },

    /// Transport-level failure reaching either endpoint.
    #[error("Network error during {endpoint} request to {url}: {reason}")]
    Network {
        endpoint: RemoteEndpoint,
        url: String,
        reason: String,
    },

    /// Non-success HTTP status from either endpoint.
    #[error("{endpoint} request to {url} was rejected with HTTP status {status}")]
    RemoteRejected {
        endpoint: RemoteEndpoint,
        url: String,
        status: u16,
    },

    /// Local filesystem failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Launch or wait failure from the OS.
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl LaunchError {
    /// Creates an InvalidVersion error.
    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotFound {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Network error.
    pub fn network(
        endpoint: RemoteEndpoint,
        url: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::Network {
            endpoint,
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a RemoteRejected error.
    pub fn remote_rejected(endpoint: RemoteEndpoint, url: impl Into<String>, status: u16) -> Self {
        Self::RemoteRejected {
            endpoint,
            url: url.into(),
            status,
        }
    }

    /// Creates an Io error bound to the path that failed.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

// ==============================================================================
// Process Supervision Errors
// ==============================================================================

/// Errors raised by the process supervisor and its state machine.
#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    #[error("Process spawn failed: {id} - {reason}")]
    SpawnFailed { id: String, reason: String },

    #[error("Process wait failed: {id} - {reason}")]
    WaitFailed { id: String, reason: String },

    #[error("Process signal failed: {id} - {signal}: {reason}")]
    SignalFailed {
        id: String,
        signal: String,
        reason: String,
    },

    #[error("Process state error: {id} - cannot move from {actual} to {expected}")]
    InvalidState {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Process operation not allowed: {id} - {operation} (state: {state})")]
    OperationNotAllowed {
        id: String,
        operation: String,
        state: String,
    },
}

impl ProcessError {
    pub fn spawn_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn wait_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WaitFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn signal_failed(
        id: impl Into<String>,
        signal: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SignalFailed {
            id: id.into(),
            signal: signal.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_state(
        id: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            id: id.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn operation_not_allowed(
        id: impl Into<String>,
        operation: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self::OperationNotAllowed {
            id: id.into(),
            operation: operation.into(),
            state: state.into(),
        }
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;
