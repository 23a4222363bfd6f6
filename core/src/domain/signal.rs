//! Signal vocabulary and termination policy.

use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// The signals tsunami knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalKind {
    /// SIGTERM: graceful termination request the process may handle.
    #[default]
    Terminate,
    /// SIGKILL: cannot be caught or ignored.
    Kill,
    /// SIGINT.
    Interrupt,
    /// SIGHUP.
    Hangup,
}

impl SignalKind {
    /// All recognized signals.
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Terminate,
        SignalKind::Kill,
        SignalKind::Interrupt,
        SignalKind::Hangup,
    ];

    /// Short conventional name without the `SIG` prefix.
    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Terminate => "TERM",
            SignalKind::Kill => "KILL",
            SignalKind::Interrupt => "INT",
            SignalKind::Hangup => "HUP",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignalKind {
    type Err = Error;

    /// Parse a signal name, case-insensitive, with or without the `SIG` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);

        SignalKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| Error::UnknownSignal(s.to_string()))
    }
}

/// How a process should be stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPolicy {
    /// SIGTERM, wait up to `wait` for exit, then SIGKILL.
    Escalate { wait: Duration },
    /// Send one signal, no liveness verification.
    Single(SignalKind),
}

impl SignalPolicy {
    /// Choose the policy for a requested signal.
    ///
    /// The default signal gets escalation; any other signal the caller named
    /// is sent exactly once.
    pub fn for_signal(kind: SignalKind, wait: Duration) -> Self {
        match kind {
            SignalKind::Terminate => SignalPolicy::Escalate { wait },
            other => SignalPolicy::Single(other),
        }
    }

    /// The first signal this policy delivers.
    pub fn signal(&self) -> SignalKind {
        match self {
            SignalPolicy::Escalate { .. } => SignalKind::Terminate,
            SignalPolicy::Single(kind) => *kind,
        }
    }
}

/// How a successful termination came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process was observed gone after SIGTERM.
    Exited,
    /// The process outlived the wait window and SIGKILL was delivered.
    ForceKilled,
    /// A single explicitly requested signal was delivered.
    Signalled(SignalKind),
}
