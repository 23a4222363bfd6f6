//! Process termination with SIGTERM to SIGKILL escalation.
//!
//! # Graceful Kill Pattern
//!
//! 1. Send SIGTERM to request a graceful shutdown
//! 2. Probe liveness every poll interval until the process is gone or the
//!    wait window elapses
//! 3. Re-check liveness once
//! 4. If still running, send SIGKILL

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::adapters::NixSignaler;
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::domain::{SignalKind, SignalPolicy, Termination};
use crate::error::Result;
use crate::ports::ProcessSignaler;

/// Escalation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Terminating,
    Escalating,
    Done(Termination),
}

/// Application service for stopping processes.
#[derive(Debug, Clone)]
pub struct Terminator<K: ProcessSignaler = NixSignaler> {
    signaler: K,
    poll_interval: Duration,
}

impl Terminator<NixSignaler> {
    /// Terminator delivering real signals.
    pub fn system() -> Self {
        Self::new(NixSignaler::new())
    }
}

impl Default for Terminator<NixSignaler> {
    fn default() -> Self {
        Self::system()
    }
}

impl<K: ProcessSignaler> Terminator<K> {
    pub fn new(signaler: K) -> Self {
        Self {
            signaler,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override how often liveness is probed while waiting.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Deliver one signal.
    pub fn signal(&self, pid: u32, signal: SignalKind) -> Result<()> {
        self.signaler.send(pid, signal)
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.signaler.is_alive(pid)
    }

    pub fn signaler(&self) -> &K {
        &self.signaler
    }

    /// Stop `pid` according to `policy`.
    pub async fn apply(&self, pid: u32, policy: SignalPolicy) -> Result<Termination> {
        match policy {
            SignalPolicy::Escalate { wait } => self.terminate_with_escalation(pid, wait).await,
            SignalPolicy::Single(kind) => {
                self.signal(pid, kind)?;
                Ok(Termination::Signalled(kind))
            }
        }
    }

    /// SIGTERM, wait up to `wait` for the process to go away, then SIGKILL.
    ///
    /// A failed SIGTERM fails the whole operation. When SIGKILL is needed its
    /// own result is the result of the operation.
    pub async fn terminate_with_escalation(&self, pid: u32, wait: Duration) -> Result<Termination> {
        let mut phase = Phase::Terminating;

        loop {
            phase = match phase {
                Phase::Terminating => {
                    self.signal(pid, SignalKind::Terminate)?;
                    debug!(pid, ?wait, "SIGTERM sent, waiting for exit");

                    // A wait too large for the clock has no deadline
                    let deadline = Instant::now().checked_add(wait);
                    if self.wait_for_exit(pid, deadline).await {
                        Phase::Done(Termination::Exited)
                    } else {
                        Phase::Escalating
                    }
                }
                Phase::Escalating => {
                    if self.is_alive(pid) {
                        debug!(pid, "Process still running, sending SIGKILL");
                        self.signal(pid, SignalKind::Kill)?;
                        Phase::Done(Termination::ForceKilled)
                    } else {
                        Phase::Done(Termination::Exited)
                    }
                }
                Phase::Done(termination) => {
                    debug!(pid, ?termination, "Process terminated");
                    return Ok(termination);
                }
            };
        }
    }

    /// True once the process is observed gone; false if `deadline` passes first.
    /// Without a deadline, polls until the process is gone.
    async fn wait_for_exit(&self, pid: u32, deadline: Option<Instant>) -> bool {
        loop {
            if !self.is_alive(pid) {
                return true;
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    self.poll_interval.min(deadline - now)
                }
                None => self.poll_interval,
            };
            sleep(pause).await;
        }
    }
}
