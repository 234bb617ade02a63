//! SignalAdapter trait - the platform contract for process-group control.
//!
//! Every target links exactly one implementation. Shared supervision logic
//! only talks to this trait and never checks which platform it runs on.

use crate::handle::ChildHandle;
use async_trait::async_trait;
use mcw_common::{ProcessResult, TerminationSignal};
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Primitive process-group operations.
///
/// Failures from [`force_kill`](SignalAdapter::force_kill) and
/// [`escalate_terminate`](SignalAdapter::escalate_terminate) are swallowed:
/// the goal of both is "the process is not running", which a vanished
/// process already satisfies.
#[async_trait]
pub trait SignalAdapter: Send + Sync + 'static {
    /// Configure `command` so the spawned child is isolated in its own group.
    ///
    /// Must be called before spawning. Degraded platforms leave the command
    /// untouched.
    fn create_isolated_group(&self, command: &mut Command);

    /// Build the handle for a freshly spawned child.
    fn track(&self, pid: u32) -> ChildHandle;

    /// Deliver `signal` to the child's group (or the single process).
    ///
    /// Delivering to a group that no longer exists is not an error.
    fn forward_signal(&self, child: &ChildHandle, signal: TerminationSignal) -> ProcessResult<()>;

    /// Polite terminate, then an unconditional kill once `grace` elapses.
    ///
    /// Returns early without killing if `exited` is cancelled first. The
    /// kill is sent at most once and never retried.
    async fn escalate_terminate(
        &self,
        child: ChildHandle,
        grace: Duration,
        exited: CancellationToken,
    );

    /// Kill the group (or the single process) immediately.
    fn force_kill(&self, child: &ChildHandle);

    /// Grace period used when the caller does not configure one.
    fn default_grace_period(&self) -> Duration;
}
