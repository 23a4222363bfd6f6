//! Port scanner for platforms without a readable kernel socket table (macOS).
//!
//! Shells out to `lsof` and parses its tabular output.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::{PortBinding, Transport};
use crate::error::{Error, Result};
use crate::ports::BindingSource;

use super::utils::parse_address;

/// Flags passed to lsof:
/// - -iTCP: Show only TCP sockets
/// - -sTCP:LISTEN: Show only listening sockets
/// - -n: Show IP addresses (don't resolve to hostnames)
/// - -P: Show port numbers (don't resolve to service names)
/// - +c 0: Show full command name (unlimited length)
const LSOF_ARGS: [&str; 6] = ["-iTCP", "-sTCP:LISTEN", "-n", "-P", "+c", "0"];

/// lsof exits with this code when nothing matched the selection.
const LSOF_NO_MATCHES: i32 = 1;

/// Columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME
const MIN_FIELDS: usize = 9;
const NAME_COLUMN: usize = 8;

/// lsof-backed scanner.
#[derive(Debug, Clone)]
pub struct LsofScanner {
    program: PathBuf,
}

impl LsofScanner {
    /// Create a scanner that runs `lsof` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("lsof")
    }

    /// Create a scanner that runs a specific lsof binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for LsofScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingSource for LsofScanner {
    async fn read_bindings(&self) -> Result<Vec<PortBinding>> {
        let output = Command::new(&self.program)
            .args(LSOF_ARGS)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::SourceUnavailable(
                    "lsof not found. Install with: brew install lsof".to_string(),
                ),
                _ => Error::SourceUnavailable(format!("failed to run lsof: {}", e)),
            })?;

        if !output.status.success() {
            if output.status.code() != Some(LSOF_NO_MATCHES) {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(status = %output.status, "lsof failed");
                return Err(Error::SourceUnavailable(format!(
                    "lsof failed ({}): {}",
                    output.status,
                    stderr.trim()
                )));
            }
            if output.stdout.is_empty() {
                debug!("lsof reported no listening sockets");
                return Ok(Vec::new());
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_lsof_output(&stdout))
    }
}

/// Parse lsof output into bindings, in source order.
///
/// Expected lsof output format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
///
/// Lines that cannot be decoded are skipped. Sockets are never deduplicated:
/// a process listening on both IPv4 and IPv6 yields two bindings.
pub(crate) fn parse_lsof_output(output: &str) -> Vec<PortBinding> {
    let mut bindings = Vec::new();

    // Skip header line
    for line in output.lines().skip(1) {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < MIN_FIELDS {
            continue;
        }

        let process_name = unescape_command(components[0]);

        let pid: u32 = match components[1].parse() {
            Ok(p) if p > 0 => p,
            _ => continue,
        };

        let owner = components[2];

        let transport = if components[4] == "IPv6" {
            Transport::Tcp6
        } else {
            Transport::Tcp
        };

        // Search backwards for the NAME column: the last component with ":"
        // that isn't a device ID or an offset
        let name = components[NAME_COLUMN..]
            .iter()
            .rev()
            .find(|c| c.contains(':') && !c.starts_with("0x") && !c.starts_with("0t"));
        let Some(name) = name else {
            continue;
        };

        let Some((address, port)) = parse_address(name) else {
            continue;
        };

        bindings.push(PortBinding::new(
            port,
            pid,
            process_name,
            owner,
            transport,
            address,
        ));
    }

    bindings
}

/// lsof escapes unprintable bytes in command names.
fn unescape_command(raw: &str) -> String {
    raw.replace("\\x20", " ") // Space
        .replace("\\x2f", "/") // Slash
}
