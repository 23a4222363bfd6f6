//! List command - show all listening ports.

use anyhow::{Context, Result};
use tsunami_core::{filter_bindings, BindingFilter, PortBinding, Resolver};

const PROCESS_WIDTH: usize = 20;

pub async fn run(filter: Option<&str>, json: bool) -> Result<()> {
    let resolver = Resolver::system();
    let mut bindings = resolver
        .scan()
        .await
        .context("failed to scan listening ports")?;

    if let Some(expr) = filter.filter(|f| !f.is_empty()) {
        bindings = filter_bindings(bindings, &BindingFilter::parse(expr));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&bindings)?);
    } else {
        print!("{}", render_table(&bindings));
    }
    Ok(())
}

/// Render bindings as the plain-text listing table.
pub fn render_table(bindings: &[PortBinding]) -> String {
    if bindings.is_empty() {
        return "No listening ports found\n".to_string();
    }

    let mut out = format!(
        "{:<8} {:<10} {:<20} {:<15} {}\n",
        "PORT", "PID", "PROCESS", "USER", "PROTO"
    );
    out.push_str(&"-".repeat(65));
    out.push('\n');

    for binding in bindings {
        out.push_str(&format!(
            "{:<8} {:<10} {:<20} {:<15} {}\n",
            binding.port(),
            binding.pid(),
            truncate(binding.process_name(), PROCESS_WIDTH),
            binding.owner(),
            binding.transport()
        ));
    }
    out
}

/// Shorten to `max` characters, ending in `...` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
