//! Application layer - Use case services.
//!
//! Services are thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for operating system access
//! - Return domain types as outputs

mod kill_service;
mod resolver;
mod terminator;

pub use kill_service::{KillRequest, KillService};
pub use resolver::{validate_port, Resolver};
pub use terminator::Terminator;
