//! Tsunami CLI - Kill processes listening on network ports
//!
//! Without arguments, opens an interactive selector. With port arguments,
//! kills the processes listening on those ports directly.

mod commands;
mod telemetry;
mod tui;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use tsunami_core::{KillRequest, SignalKind, SignalPolicy, TerminateConfig};

use commands::kill::KillOptions;
use commands::targets;

#[derive(Parser, Debug)]
#[command(name = "tsunami")]
#[command(version, about = "Kill processes listening on ports")]
#[command(after_help = "\
Examples:
  tsunami                    Interactive mode
  tsunami 3000               Kill process on port 3000 (with confirmation)
  tsunami 3000 -f            Kill without confirmation
  tsunami 3000-3010          Kill processes on ports 3000 through 3010
  tsunami 3000,8080,9000     Comma-separated ports
  tsunami -l --json          List ports as JSON
  tsunami -l --filter node   List only node processes
  tsunami 3000 -s KILL       Send SIGKILL immediately
  tsunami 3000 --timeout 5s  Wait 5s before escalating to SIGKILL
  tsunami --pid 1234         Kill process by PID directly")]
struct Cli {
    /// Ports to kill: 3000, 3000-3010 or 3000,8080
    #[arg(value_name = "PORT")]
    ports: Vec<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,

    /// Signal to send (TERM, KILL, INT, HUP)
    #[arg(short, long, default_value = "TERM", env = "TSUNAMI_SIGNAL")]
    signal: String,

    /// List listening ports and exit
    #[arg(short, long)]
    list: bool,

    /// Suppress output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Show what would be killed without killing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Kill all processes on a port (when multiple)
    #[arg(short, long)]
    all: bool,

    /// Output in JSON format (for --list)
    #[arg(long)]
    json: bool,

    /// Filter by process name, or user=<name> (for --list)
    #[arg(long)]
    filter: Option<String>,

    /// Time to wait before escalating SIGTERM to SIGKILL (500ms, 2s, 1m)
    #[arg(
        short,
        long,
        default_value = "2s",
        env = "TSUNAMI_TIMEOUT",
        value_parser = targets::parse_duration
    )]
    timeout: Duration,

    /// Kill processes by PID directly (repeatable, comma separated)
    #[arg(short, long = "pid", value_name = "PID", value_delimiter = ',')]
    pids: Vec<u32>,

    /// Never open the interactive selector; list instead
    #[arg(long)]
    no_tui: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init_logging();

    // List mode
    if cli.list {
        commands::list::run(cli.filter.as_deref(), cli.json).await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Parse signal early to fail fast
    let signal: SignalKind = cli.signal.parse()?;
    let request = KillRequest {
        policy: SignalPolicy::for_signal(signal, cli.timeout),
        all: cli.all,
        dry_run: cli.dry_run,
    };
    let options = KillOptions {
        force: cli.force,
        quiet: cli.quiet,
    };

    if !cli.pids.is_empty() {
        return commands::kill::pids(&cli.pids, &request, options).await;
    }

    if cli.ports.is_empty() {
        if cli.force {
            bail!("--force requires port argument");
        }
        if cli.dry_run {
            bail!("--dry-run requires port argument");
        }

        if cli.no_tui || !atty::is(atty::Stream::Stdout) {
            commands::list::run(cli.filter.as_deref(), cli.json).await?;
        } else {
            tui::run(TerminateConfig::with_wait(cli.timeout)).await?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let ports = targets::expand_port_args(&cli.ports)?;
    commands::kill::ports(&ports, &request, options).await
}
