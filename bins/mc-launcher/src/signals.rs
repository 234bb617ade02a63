//! Shutdown requests delivered to the launcher itself.

use mcw_common::TerminationSignal;
use std::io;
use tracing::info;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Stream of SIGINT/SIGTERM (Ctrl+C on Windows) as termination requests.
///
/// Installing it replaces the default "terminate the launcher" action, so
/// every delivery must be handled by the caller.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl ShutdownSignals {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(windows)]
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Next request, or `None` once no more can arrive.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Option<TerminationSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => {
                info!("Received SIGINT signal");
                Some(TerminationSignal::Interrupt)
            }
            Some(()) = self.terminate.recv() => {
                info!("Received SIGTERM signal");
                Some(TerminationSignal::Terminate)
            }
            else => None,
        }
    }

    #[cfg(windows)]
    pub async fn recv(&mut self) -> Option<TerminationSignal> {
        self.ctrl_c.recv().await?;
        info!("Received Ctrl+C signal");
        Some(TerminationSignal::Interrupt)
    }
}
