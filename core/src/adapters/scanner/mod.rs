//! Port scanner adapters.
//!
//! Two strategies:
//! - Linux: read the kernel socket tables under `/proc` directly.
//! - macOS: no kernel table is exposed, so run `lsof`.
//!
//! Both are compiled everywhere so their parsers are tested on every host;
//! the strategy is picked from the running OS.

mod lsof;
mod procnet;
mod utils;

pub use lsof::LsofScanner;
pub use procnet::{AccountLookup, ProcNetScanner};

use crate::domain::PortBinding;
use crate::error::{Error, Result};
use crate::ports::BindingSource;

/// The main port scanner that uses the strategy for the current platform.
#[derive(Debug, Clone)]
pub struct PortScanner {
    inner: Strategy,
}

#[derive(Debug, Clone)]
enum Strategy {
    KernelTable(ProcNetScanner),
    ExternalTool(LsofScanner),
    Unsupported(String),
}

impl PortScanner {
    /// Create a new port scanner for the current platform.
    pub fn new() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    /// Create the scanner a given operating system would use.
    pub fn for_os(os: &str) -> Self {
        let inner = match os {
            "linux" => Strategy::KernelTable(ProcNetScanner::new()),
            "macos" => Strategy::ExternalTool(LsofScanner::new()),
            other => Strategy::Unsupported(other.to_string()),
        };
        Self { inner }
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingSource for PortScanner {
    async fn read_bindings(&self) -> Result<Vec<PortBinding>> {
        match &self.inner {
            Strategy::KernelTable(scanner) => scanner.read_bindings().await,
            Strategy::ExternalTool(scanner) => scanner.read_bindings().await,
            Strategy::Unsupported(os) => Err(Error::PlatformUnsupported(os.clone())),
        }
    }
}
