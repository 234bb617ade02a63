//! Unix process-group control.
//!
//! The child is spawned as the leader of a new process group (pgid == pid),
//! so `killpg` reaches the child and everything it spawned. Signals:
//! Interrupt -> SIGINT, Terminate -> SIGTERM, Kill -> SIGKILL.

use crate::adapter::SignalAdapter;
use crate::handle::ChildHandle;
use async_trait::async_trait;
use mcw_common::{ProcessError, ProcessResult, TerminationSignal};
use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Grace period between SIGTERM and SIGKILL.
pub const UNIX_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Process-group adapter for unix targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixSignalAdapter;

impl UnixSignalAdapter {
    pub fn new() -> Self {
        Self
    }

    fn deliver(&self, child: &ChildHandle, signal: Signal) -> nix::Result<()> {
        match child.process_group() {
            Some(pgid) => killpg(Pid::from_raw(pgid), signal),
            None => kill(Pid::from_raw(child.pid() as i32), signal),
        }
    }
}

fn to_nix_signal(signal: TerminationSignal) -> Signal {
    match signal {
        TerminationSignal::Interrupt => Signal::SIGINT,
        TerminationSignal::Terminate => Signal::SIGTERM,
        TerminationSignal::Kill => Signal::SIGKILL,
    }
}

#[async_trait]
impl SignalAdapter for UnixSignalAdapter {
    fn create_isolated_group(&self, command: &mut Command) {
        // 0 = new group whose id is the child's pid
        command.process_group(0);
    }

    fn track(&self, pid: u32) -> ChildHandle {
        ChildHandle::grouped(pid)
    }

    fn forward_signal(&self, child: &ChildHandle, signal: TerminationSignal) -> ProcessResult<()> {
        let nix_signal = to_nix_signal(signal);
        match self.deliver(child, nix_signal) {
            Ok(()) => {
                debug!("Sent {} to {}", nix_signal, child);
                Ok(())
            }
            Err(Errno::ESRCH) => {
                debug!("{} already gone, {} not delivered", child, nix_signal);
                Ok(())
            }
            Err(e) => Err(ProcessError::signal_failed(
                child.pid().to_string(),
                nix_signal.as_str(),
                e.to_string(),
            )),
        }
    }

    async fn escalate_terminate(
        &self,
        child: ChildHandle,
        grace: Duration,
        exited: CancellationToken,
    ) {
        if let Err(e) = self.forward_signal(&child, TerminationSignal::Terminate) {
            warn!("Failed to send SIGTERM to {}: {}", child, e);
        }

        tokio::select! {
            _ = exited.cancelled() => {
                debug!("{} exited within grace period, escalation cancelled", child);
                return;
            }
            _ = tokio::time::sleep(grace) => {}
        }

        info!(
            "Grace period of {:?} elapsed for {}, sending SIGKILL",
            grace, child
        );
        self.force_kill(&child);
    }

    fn force_kill(&self, child: &ChildHandle) {
        if let Err(e) = self.forward_signal(child, TerminationSignal::Kill) {
            debug!("Force kill of {} ignored: {}", child, e);
        }
    }

    fn default_grace_period(&self) -> Duration {
        UNIX_GRACE_PERIOD
    }
}
