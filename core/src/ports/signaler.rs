//! Process signaler port (interface).

use crate::domain::SignalKind;
use crate::error::Result;

/// Port for delivering signals to processes.
///
/// Delivery is a single syscall, so the methods are synchronous.
pub trait ProcessSignaler: Send + Sync {
    /// Deliver `signal` to `pid`.
    ///
    /// Fails with `ProcessNotFound`, `PermissionDenied`, or `SignalFailed`.
    fn send(&self, pid: u32, signal: SignalKind) -> Result<()>;

    /// Zero-effect probe: true while a process with this PID exists.
    ///
    /// A process we may not signal still exists and counts as alive.
    fn is_alive(&self, pid: u32) -> bool;
}
