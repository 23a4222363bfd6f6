//! Tsunami Core Library
//!
//! Finds the processes listening on TCP ports and stops them.
//! Provides functionality to:
//! - Resolve listening sockets to owning processes
//! - Signal processes, escalating from SIGTERM to SIGKILL
//! - Kill several ports or PIDs in one pass with per-target reporting
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: Operating system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - Linux: Reads `/proc/net/tcp` and `/proc/net/tcp6`
//! - macOS: Uses `lsof`
//! - Other Unix systems build but report `PlatformUnsupported`

#[cfg(not(unix))]
compile_error!("Unsupported platform: tsunami requires a Unix system");

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    filter_bindings, BindingFilter, KillOutcome, KillReport, KillTarget, PortBinding, PortClass,
    SignalKind, SignalPolicy, Termination, Transport,
};

// Re-export other commonly used types
pub use adapters::{NixSignaler, PortScanner};
pub use application::{validate_port, KillRequest, KillService, Resolver, Terminator};
pub use config::TerminateConfig;
pub use error::{Error, Result};
pub use ports::{BindingSource, ProcessSignaler};
