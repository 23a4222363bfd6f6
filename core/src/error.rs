//! Error types for the tsunami-core library.

use thiserror::Error;

/// Result type alias for tsunami operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving ports and terminating processes.
///
/// None of these are retried internally. `PermissionDenied` is kept apart from
/// `SignalFailed` because the remedy differs: elevate privileges rather than
/// try again.
#[derive(Error, Debug)]
pub enum Error {
    /// No resolution strategy exists for this operating system.
    #[error("unsupported platform: {0}")]
    PlatformUnsupported(String),

    /// The platform's introspection source could not be read.
    #[error("{0}")]
    SourceUnavailable(String),

    /// Port number outside 1-65535.
    #[error("invalid port: {0} (must be 1-65535)")]
    InvalidPort(i64),

    /// No process exists with this PID.
    #[error("process not found: no process with PID {0}")]
    ProcessNotFound(u32),

    /// The caller is not allowed to signal this process.
    #[error("permission denied to signal PID {0}. Try sudo")]
    PermissionDenied(u32),

    /// Any other OS-level failure while delivering a signal.
    #[error("failed to signal PID {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },

    /// Signal name not in TERM, KILL, INT, HUP.
    #[error("unknown signal: {0} (valid: TERM, KILL, INT, HUP)")]
    UnknownSignal(String),
}
