//! Domain layer - Pure data models.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod binding;
mod report;
mod signal;

pub use binding::{filter_bindings, BindingFilter, PortBinding, PortClass, Transport};
pub use report::{KillOutcome, KillReport, KillTarget};
pub use signal::{SignalKind, SignalPolicy, Termination};
