//! Windows single-process control (degraded mode).
//!
//! Windows has no process-group kill primitive matching `killpg`, so the
//! child is tracked individually:
//! - the child keeps the parent's console, so a console Ctrl+C reaches it
//!   directly and there is nothing to forward;
//! - escalation waits out the grace period and then calls
//!   `TerminateProcess` on the single process.

use crate::adapter::SignalAdapter;
use crate::handle::ChildHandle;
use async_trait::async_trait;
use mcw_common::{ProcessError, ProcessResult, TerminationSignal};
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

/// Grace period before `TerminateProcess`.
pub const WINDOWS_GRACE_PERIOD: Duration = Duration::from_secs(3);

/// Single-process adapter for windows targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsSignalAdapter;

impl WindowsSignalAdapter {
    pub fn new() -> Self {
        Self
    }
}

/// Terminate a process by pid with exit code 1.
fn terminate_process(pid: u32) -> Result<(), String> {
    unsafe {
        let handle = match OpenProcess(PROCESS_TERMINATE, false, pid) {
            Ok(h) if !h.is_invalid() => h,
            Ok(_) => return Err("OpenProcess returned an invalid handle".to_string()),
            Err(e) => return Err(format!("OpenProcess failed: {}", e)),
        };

        let result = TerminateProcess(handle, 1);
        let _ = CloseHandle(handle);

        result.map_err(|e| format!("TerminateProcess failed: {}", e))
    }
}

#[async_trait]
impl SignalAdapter for WindowsSignalAdapter {
    fn create_isolated_group(&self, _command: &mut Command) {
        // No group primitive: the child shares our console and process tree.
    }

    fn track(&self, pid: u32) -> ChildHandle {
        ChildHandle::single(pid)
    }

    fn forward_signal(&self, child: &ChildHandle, signal: TerminationSignal) -> ProcessResult<()> {
        match signal {
            TerminationSignal::Kill => terminate_process(child.pid()).map_err(|reason| {
                ProcessError::signal_failed(child.pid().to_string(), signal.as_str(), reason)
            }),
            TerminationSignal::Interrupt | TerminationSignal::Terminate => {
                debug!(
                    "{} not forwarded to {}: the shared console delivers it",
                    signal, child
                );
                Ok(())
            }
        }
    }

    async fn escalate_terminate(
        &self,
        child: ChildHandle,
        grace: Duration,
        exited: CancellationToken,
    ) {
        tokio::select! {
            _ = exited.cancelled() => {
                debug!("{} exited within grace period, escalation cancelled", child);
                return;
            }
            _ = tokio::time::sleep(grace) => {}
        }

        info!(
            "Grace period of {:?} elapsed for {}, terminating process",
            grace, child
        );
        self.force_kill(&child);
    }

    fn force_kill(&self, child: &ChildHandle) {
        if let Err(e) = self.forward_signal(child, TerminationSignal::Kill) {
            // Most often the process is already gone.
            debug!("Force kill of {} ignored: {}", child, e);
        }
    }

    fn default_grace_period(&self) -> Duration {
        WINDOWS_GRACE_PERIOD
    }
}
