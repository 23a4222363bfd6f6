//! Parsing of port arguments and durations.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{bail, Result};
use regex::Regex;
use tsunami_core::validate_port;

/// Largest span a range may cover (`end - start`).
const MAX_RANGE_SPAN: u16 = 1000;

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)-(\d+)$").expect("valid range regex"))
}

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)?)(ms|s|m)?$").expect("valid duration regex")
    })
}

/// Expand port arguments: `3000`, ranges `3000-3005`, comma lists `3000,8080`.
///
/// Order is preserved and duplicates are kept.
pub fn expand_port_args(args: &[String]) -> Result<Vec<u16>> {
    let mut ports = Vec::new();

    for arg in args {
        if arg.contains(',') {
            for part in arg.split(',') {
                ports.push(parse_port(part.trim())?);
            }
            continue;
        }

        if let Some(caps) = range_pattern().captures(arg) {
            let start = parse_port(&caps[1])?;
            let end = parse_port(&caps[2])?;
            if start > end {
                bail!("invalid port range: {} (start > end)", arg);
            }
            if end - start > MAX_RANGE_SPAN {
                bail!("port range too large: {} (max {} ports)", arg, MAX_RANGE_SPAN);
            }
            ports.extend(start..=end);
            continue;
        }

        ports.push(parse_port(arg)?);
    }

    Ok(ports)
}

fn parse_port(s: &str) -> Result<u16> {
    match s.parse::<i64>() {
        Ok(n) => Ok(validate_port(n)?),
        Err(_) => bail!("invalid port: {} (must be 1-65535)", s),
    }
}

/// Parse `500ms`, `2s`, `1.5s`, `1m`, or bare seconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let caps = duration_pattern()
        .captures(s.trim())
        .ok_or_else(|| format!("invalid duration: {} (use e.g. 500ms, 2s, 1m)", s))?;

    let value: f64 = caps[1]
        .parse()
        .map_err(|_| format!("invalid duration: {}", s))?;
    let seconds = match caps.get(2).map(|m| m.as_str()) {
        Some("ms") => value / 1000.0,
        Some("m") => value * 60.0,
        _ => value,
    };

    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid duration: {}: {}", s, e))
}
