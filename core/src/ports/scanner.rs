//! Binding source port (interface).

use crate::domain::PortBinding;
use crate::error::Result;

/// Port for reading the current set of listening sockets.
///
/// Implementations handle platform-specific details (`/proc/net/tcp`, `lsof`).
/// Every call is a fresh read; nothing is cached between calls.
pub trait BindingSource: Send + Sync {
    /// Read all listening TCP sockets that could be attributed to a process.
    ///
    /// The order is the source order; sorting is the caller's concern.
    fn read_bindings(&self) -> impl std::future::Future<Output = Result<Vec<PortBinding>>> + Send;
}
