//! Per-target outcomes of a multi-target kill.

use super::{PortBinding, SignalKind, Termination};

/// What was done to one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillOutcome {
    /// The process was terminated.
    Killed {
        target: KillTarget,
        termination: Termination,
    },
    /// Dry run: the process would have received `signal`.
    Planned { target: KillTarget, signal: SignalKind },
    /// The caller declined the confirmation.
    Skipped { target: KillTarget },
}

/// The process a kill was aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillTarget {
    /// A process found listening on a port.
    Binding(PortBinding),
    /// A bare PID given by the user.
    Pid(u32),
}

impl KillTarget {
    pub fn pid(&self) -> u32 {
        match self {
            KillTarget::Binding(binding) => binding.pid(),
            KillTarget::Pid(pid) => *pid,
        }
    }
}

impl std::fmt::Display for KillTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KillTarget::Binding(binding) => binding.fmt(f),
            KillTarget::Pid(pid) => write!(f, "PID {}", pid),
        }
    }
}

/// Aggregate result of processing several ports or PIDs.
///
/// Each target is independent: a failure is recorded and processing moves on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KillReport {
    pub outcomes: Vec<KillOutcome>,
    pub failures: Vec<String>,
}

impl KillReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: KillOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    /// True when no target failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of processes actually terminated.
    pub fn killed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, KillOutcome::Killed { .. }))
            .count()
    }
}
