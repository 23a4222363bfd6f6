//! Port binding domain models.

use serde::Serialize;

// ============================================================================
// Transport
// ============================================================================

/// Address family of a listening socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// IPv4 listener.
    Tcp,
    /// IPv6 listener.
    Tcp6,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
            Transport::Tcp6 => "tcp6",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PortClass
// ============================================================================

/// IANA range a port number falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortClass {
    /// 0-1023, usually needs root to bind.
    System,
    /// 1024-49151.
    Registered,
    /// 49152-65535.
    Ephemeral,
}

impl PortClass {
    pub fn of(port: u16) -> Self {
        match port {
            0..=1023 => PortClass::System,
            1024..=49151 => PortClass::Registered,
            _ => PortClass::Ephemeral,
        }
    }
}

// ============================================================================
// PortBinding
// ============================================================================

/// One observed association between a listening TCP port and its owning process.
///
/// A binding is a snapshot: it is never updated in place, only superseded by
/// the next scan. Several bindings may share a port when processes use
/// `SO_REUSEPORT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PortBinding {
    port: u16,
    pid: u32,
    #[serde(rename = "process")]
    process_name: String,
    #[serde(rename = "user")]
    owner: String,
    #[serde(rename = "proto")]
    transport: Transport,
    address: String,
}

impl PortBinding {
    /// Create a binding from scan results.
    pub fn new(
        port: u16,
        pid: u32,
        process_name: impl Into<String>,
        owner: impl Into<String>,
        transport: Transport,
        address: impl Into<String>,
    ) -> Self {
        Self {
            port,
            pid,
            process_name: process_name.into(),
            owner: owner.into(),
            transport,
            address: address.into(),
        }
    }

    /// The local listening port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// PID of the owning process.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Short program name, empty if it could not be read.
    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Account name, or the numeric uid when the account database had no entry.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Local bind address (e.g. "*", "127.0.0.1", "[::1]").
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port_class(&self) -> PortClass {
        PortClass::of(self.port)
    }

    /// Check if this binding matches an interactive search query.
    ///
    /// Matches the port number as a substring, or the process name or owner
    /// case-insensitively.
    pub fn matches_search(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_lowercase();
        self.port.to_string().contains(&query_lower)
            || self.process_name.to_lowercase().contains(&query_lower)
            || self.owner.to_lowercase().contains(&query_lower)
    }
}

impl std::fmt::Display for PortBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (PID {}) on port {}",
            self.process_name, self.pid, self.port
        )
    }
}

// ============================================================================
// BindingFilter
// ============================================================================

/// Filter applied to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingFilter {
    /// Exact owner match, case-insensitive (`user=<name>`).
    Owner(String),
    /// Case-insensitive substring of the process name.
    ProcessName(String),
}

impl BindingFilter {
    /// Parse a filter expression. `user=<name>` selects by owner, anything else
    /// by process name.
    pub fn parse(expr: &str) -> Self {
        match expr.strip_prefix("user=") {
            Some(user) => BindingFilter::Owner(user.to_string()),
            None => BindingFilter::ProcessName(expr.to_lowercase()),
        }
    }

    pub fn matches(&self, binding: &PortBinding) -> bool {
        match self {
            BindingFilter::Owner(user) => binding.owner.eq_ignore_ascii_case(user),
            BindingFilter::ProcessName(needle) => {
                binding.process_name.to_lowercase().contains(needle.as_str())
            }
        }
    }
}

/// Keep the bindings matching `filter`, preserving order.
pub fn filter_bindings(bindings: Vec<PortBinding>, filter: &BindingFilter) -> Vec<PortBinding> {
    bindings.into_iter().filter(|b| filter.matches(b)).collect()
}
