//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the operating system. Implementations live in `adapters`.

mod scanner;
mod signaler;

pub use scanner::BindingSource;
pub use signaler::ProcessSignaler;
