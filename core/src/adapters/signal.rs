//! Signal delivery through `kill(2)`.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::domain::SignalKind;
use crate::error::{Error, Result};
use crate::ports::ProcessSignaler;

impl From<SignalKind> for Signal {
    fn from(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Terminate => Signal::SIGTERM,
            SignalKind::Kill => Signal::SIGKILL,
            SignalKind::Interrupt => Signal::SIGINT,
            SignalKind::Hangup => Signal::SIGHUP,
        }
    }
}

/// Signaler backed by the `kill` syscall.
#[derive(Debug, Default, Clone, Copy)]
pub struct NixSignaler;

impl NixSignaler {
    pub fn new() -> Self {
        Self
    }
}

/// PID 0 and negative PIDs address process groups, never a single process.
fn to_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

impl ProcessSignaler for NixSignaler {
    fn send(&self, pid: u32, signal: SignalKind) -> Result<()> {
        let target = to_pid(pid).ok_or(Error::ProcessNotFound(pid))?;

        debug!(pid, %signal, "Sending signal");
        match kill(target, Signal::from(signal)) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(pid, "Process not found");
                Err(Error::ProcessNotFound(pid))
            }
            Err(Errno::EPERM) => {
                warn!(pid, %signal, "Permission denied");
                Err(Error::PermissionDenied(pid))
            }
            Err(errno) => Err(Error::SignalFailed {
                pid,
                reason: errno.desc().to_string(),
            }),
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        let Some(target) = to_pid(pid) else {
            return false;
        };
        // EPERM: the process exists but belongs to someone else.
        matches!(kill(target, None), Ok(()) | Err(Errno::EPERM))
    }
}
