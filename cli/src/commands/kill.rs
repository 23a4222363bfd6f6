//! Kill command - stop processes by port or PID.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Result;
use tsunami_core::{KillOutcome, KillReport, KillRequest, KillService, KillTarget};

/// Output and prompting behaviour for a direct kill.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillOptions {
    /// Skip confirmation prompts.
    pub force: bool,
    /// Print errors only.
    pub quiet: bool,
}

pub async fn ports(ports: &[u16], request: &KillRequest, options: KillOptions) -> Result<ExitCode> {
    let service = KillService::system();
    let report = service
        .kill_ports(ports, request, |target| options.force || confirm_target(target))
        .await;
    Ok(finish(&report, options))
}

pub async fn pids(pids: &[u32], request: &KillRequest, options: KillOptions) -> Result<ExitCode> {
    let service = KillService::system();
    let report = service
        .kill_pids(pids, request, |target| options.force || confirm_target(target))
        .await;
    Ok(finish(&report, options))
}

fn confirm_target(target: &KillTarget) -> bool {
    let stdin = io::stdin();
    confirm(&format!("Kill {}?", target), &mut stdin.lock(), &mut io::stdout())
}

/// Ask a yes/no question. Only `y` or `yes` (any case) accepts.
fn confirm(message: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{} [y/N] ", message)
        .and_then(|_| output.flush())
        .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

/// Print the report and turn it into an exit status.
fn finish(report: &KillReport, options: KillOptions) -> ExitCode {
    for line in outcome_lines(report, options.quiet) {
        println!("{}", line);
    }
    for failure in &report.failures {
        eprintln!("Error: {}", failure);
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn outcome_lines(report: &KillReport, quiet: bool) -> Vec<String> {
    report
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            KillOutcome::Killed { target, .. } if !quiet => Some(format!("Killed {}", target)),
            KillOutcome::Planned { target, signal } => {
                Some(format!("Would kill: {} with signal {}", target, signal))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tsunami_core::{PortBinding, SignalKind, Termination, Transport};

    fn node() -> KillTarget {
        KillTarget::Binding(PortBinding::new(3000, 42, "node", "mike", Transport::Tcp, "*"))
    }

    #[test]
    fn test_confirm_answers() {
        for (answer, expected) in [
            ("y\n", true),
            ("yes\n", true),
            ("YES\n", true),
            (" Y \n", true),
            ("n\n", false),
            ("\n", false),
            ("", false),
            ("yep\n", false),
        ] {
            let mut output = Vec::new();
            let accepted = confirm("Kill PID 1?", &mut Cursor::new(answer), &mut output);
            assert_eq!(accepted, expected, "{answer:?}");
            assert_eq!(String::from_utf8(output).unwrap(), "Kill PID 1? [y/N] ");
        }
    }

    #[test]
    fn test_outcome_lines() {
        let report = KillReport {
            outcomes: vec![
                KillOutcome::Killed {
                    target: node(),
                    termination: Termination::Exited,
                },
                KillOutcome::Killed {
                    target: KillTarget::Pid(7),
                    termination: Termination::Signalled(SignalKind::Kill),
                },
                KillOutcome::Skipped {
                    target: KillTarget::Pid(8),
                },
                KillOutcome::Planned {
                    target: node(),
                    signal: SignalKind::Terminate,
                },
            ],
            failures: vec![],
        };

        assert_eq!(
            outcome_lines(&report, false),
            vec![
                "Killed node (PID 42) on port 3000",
                "Killed PID 7",
                "Would kill: node (PID 42) on port 3000 with signal TERM",
            ]
        );

        // Quiet keeps the dry-run plan
        assert_eq!(
            outcome_lines(&report, true),
            vec!["Would kill: node (PID 42) on port 3000 with signal TERM"]
        );
    }
}
