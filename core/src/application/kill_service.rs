//! Multi-target kill orchestration.
//!
//! Resolves ports to processes, asks the caller to confirm each one, and
//! stops them with the requested policy. Targets are processed one after
//! another; a failed target is recorded and does not stop the rest.

use tracing::debug;

use crate::adapters::{NixSignaler, PortScanner};
use crate::domain::{KillOutcome, KillReport, KillTarget, SignalPolicy};
use crate::ports::{BindingSource, ProcessSignaler};

use super::{Resolver, Terminator};

/// What to do with each process found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillRequest {
    pub policy: SignalPolicy,
    /// Kill every process sharing a port instead of refusing.
    pub all: bool,
    /// Record what would be signalled without signalling.
    pub dry_run: bool,
}

impl KillRequest {
    pub fn new(policy: SignalPolicy) -> Self {
        Self {
            policy,
            all: false,
            dry_run: false,
        }
    }
}

/// Application service behind direct port and PID invocations.
#[derive(Debug, Clone)]
pub struct KillService<S: BindingSource = PortScanner, K: ProcessSignaler = NixSignaler> {
    resolver: Resolver<S>,
    terminator: Terminator<K>,
}

impl KillService<PortScanner, NixSignaler> {
    /// Service over the running system.
    pub fn system() -> Self {
        Self::new(Resolver::system(), Terminator::system())
    }
}

impl<S: BindingSource, K: ProcessSignaler> KillService<S, K> {
    pub fn new(resolver: Resolver<S>, terminator: Terminator<K>) -> Self {
        Self {
            resolver,
            terminator,
        }
    }

    /// Stop the processes listening on each of `ports`.
    ///
    /// `confirm` is asked once per process (never on a dry run); returning
    /// false skips that process.
    pub async fn kill_ports<F>(&self, ports: &[u16], request: &KillRequest, mut confirm: F) -> KillReport
    where
        F: FnMut(&KillTarget) -> bool,
    {
        let mut report = KillReport::new();

        for &port in ports {
            let matches = match self.resolver.find_by_port(i64::from(port)).await {
                Ok(matches) => matches,
                Err(e) => {
                    report.fail(format!("port {}: {}", port, e));
                    continue;
                }
            };

            if matches.is_empty() {
                report.fail(format!("no process listening on port {}", port));
                continue;
            }

            if matches.len() > 1 && !request.all {
                let pids: Vec<String> = matches.iter().map(|b| b.pid().to_string()).collect();
                report.fail(format!(
                    "multiple processes on port {}: {}. Use --all to kill all",
                    port,
                    pids.join(", ")
                ));
                continue;
            }

            for binding in matches {
                self.kill_target(KillTarget::Binding(binding), request, &mut confirm, &mut report)
                    .await;
            }
        }

        report
    }

    /// Stop each of `pids` directly, without resolving ports.
    pub async fn kill_pids<F>(&self, pids: &[u32], request: &KillRequest, mut confirm: F) -> KillReport
    where
        F: FnMut(&KillTarget) -> bool,
    {
        let mut report = KillReport::new();
        for &pid in pids {
            self.kill_target(KillTarget::Pid(pid), request, &mut confirm, &mut report)
                .await;
        }
        report
    }

    async fn kill_target<F>(
        &self,
        target: KillTarget,
        request: &KillRequest,
        confirm: &mut F,
        report: &mut KillReport,
    ) where
        F: FnMut(&KillTarget) -> bool,
    {
        if request.dry_run {
            report.record(KillOutcome::Planned {
                target,
                signal: request.policy.signal(),
            });
            return;
        }

        if !confirm(&target) {
            debug!(pid = target.pid(), "Kill declined");
            report.record(KillOutcome::Skipped { target });
            return;
        }

        match self.terminator.apply(target.pid(), request.policy).await {
            Ok(termination) => report.record(KillOutcome::Killed {
                target,
                termination,
            }),
            Err(e) => report.fail(format!("{}: {}", target, e)),
        }
    }
}
