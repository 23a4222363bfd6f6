//! Adapters layer - Operating system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.

pub mod scanner;
pub mod signal;

// Re-export main types for convenience
pub use scanner::{LsofScanner, PortScanner, ProcNetScanner};
pub use signal::NixSignaler;
