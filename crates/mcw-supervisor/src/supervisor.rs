//! ProcessSupervisor - owns the server child for the lifetime of a session.
//!
//! One long-running [`wait`](ProcessSupervisor::wait) blocks on the child
//! while shutdown requests arrive from elsewhere (usually a signal handler
//! task) through clones of the same supervisor. The two sides share:
//! - the state machine and the current [`ChildHandle`], behind sync mutexes
//!   that are never held across an await;
//! - the OS child itself, behind an async mutex that only `launch` and
//!   `wait` touch, so signalling never waits for the wait to finish.

use crate::launch::{write_eula, LaunchSpec};
use mcw_common::{LaunchResult, ProcessError, ProcessResult, TerminationSignal};
use mcw_process::{ChildHandle, PlatformSignalAdapter, SignalAdapter};
use mcw_process_state::{StateTransition, SupervisorState, SupervisorStateMachine};
use parking_lot::Mutex;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a shutdown request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Polite signal sent; a kill follows if the grace period runs out.
    Escalating,
    /// The group was killed immediately.
    ForceKilled,
    /// Nothing to do, the child is already gone.
    AlreadyExited,
}

struct Inner<A> {
    id: String,
    adapter: A,
    grace_period: Duration,
    state: Mutex<SupervisorStateMachine>,
    child: Mutex<Option<ChildHandle>>,
    process: tokio::sync::Mutex<Option<Child>>,
    exit_status: Mutex<Option<ExitStatus>>,
    exited: CancellationToken,
    escalation: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle to a single supervised child.
pub struct ProcessSupervisor<A: SignalAdapter = PlatformSignalAdapter> {
    inner: Arc<Inner<A>>,
}

impl<A: SignalAdapter> Clone for ProcessSupervisor<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ProcessSupervisor<PlatformSignalAdapter> {
    /// Supervisor using the platform adapter and its default grace period.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_adapter(id, PlatformSignalAdapter::default())
    }
}

impl<A: SignalAdapter> ProcessSupervisor<A> {
    pub fn with_adapter(id: impl Into<String>, adapter: A) -> Self {
        let grace = adapter.default_grace_period();
        Self::with_grace_period(id, adapter, grace)
    }

    pub fn with_grace_period(id: impl Into<String>, adapter: A, grace_period: Duration) -> Self {
        let id = id.into();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SupervisorStateMachine::new(&id)),
                id,
                adapter,
                grace_period,
                child: Mutex::new(None),
                process: tokio::sync::Mutex::new(None),
                exit_status: Mutex::new(None),
                exited: CancellationToken::new(),
                escalation: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn grace_period(&self) -> Duration {
        self.inner.grace_period
    }

    pub fn state(&self) -> SupervisorState {
        self.inner.state.lock().current_state()
    }

    /// Handle of the launched child, if any.
    pub fn child(&self) -> Option<ChildHandle> {
        *self.inner.child.lock()
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        *self.inner.exit_status.lock()
    }

    pub fn state_history(&self) -> Vec<StateTransition> {
        self.inner.state.lock().state_history().to_vec()
    }

    /// Spawn the child described by `spec` in its own process group.
    ///
    /// Writes the EULA marker into the working directory first; if that
    /// fails nothing is spawned and the supervisor stays `Idle`. Stdio is
    /// inherited unmodified.
    pub async fn launch(&self, spec: &LaunchSpec) -> LaunchResult<ChildHandle> {
        self.inner
            .state
            .lock()
            .require("launch", &[SupervisorState::Idle])?;

        write_eula(&spec.working_dir)?;

        let mut process = self.inner.process.lock().await;
        let mut state = self.inner.state.lock();
        state.transition_to_launching()?;

        info!(
            "Launching {}: {:?} {:?} in {}",
            self.inner.id,
            spec.executable,
            spec.args,
            spec.working_dir.display()
        );

        let mut command = Command::new(&spec.executable);
        command
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        self.inner.adapter.create_isolated_group(&mut command);

        let spawned = command
            .spawn()
            .map_err(|e| e.to_string())
            .and_then(|child| match child.id() {
                Some(pid) => Ok((child, pid)),
                None => Err("child exited before its pid was read".to_string()),
            });

        match spawned {
            Ok((child, pid)) => {
                let handle = self.inner.adapter.track(pid);
                *self.inner.child.lock() = Some(handle);
                *process = Some(child);
                state.transition_to_running(pid)?;
                info!(pid, "Process {} running as {}", self.inner.id, handle);
                Ok(handle)
            }
            Err(reason) => {
                error!("Failed to spawn {}: {}", self.inner.id, reason);
                state.transition_to_exited(format!("Spawn failed: {}", reason))?;
                self.inner.exited.cancel();
                Err(ProcessError::spawn_failed(&self.inner.id, reason).into())
            }
        }
    }

    /// Ask the child to stop.
    ///
    /// The first Interrupt/Terminate while `Running` is forwarded to the
    /// group and starts the grace-then-kill escalation. Any request while
    /// already `Terminating`, and any `Kill`, is a [`force_kill`](Self::force_kill).
    /// Must be called from within a tokio runtime.
    pub fn request_shutdown(&self, signal: TerminationSignal) -> ProcessResult<ShutdownOutcome> {
        let mut state = self.inner.state.lock();
        match state.current_state() {
            SupervisorState::Exited => return Ok(ShutdownOutcome::AlreadyExited),
            SupervisorState::Running if signal.is_graceful() => {}
            SupervisorState::Running | SupervisorState::Terminating => {
                drop(state);
                self.force_kill()?;
                return Ok(ShutdownOutcome::ForceKilled);
            }
            SupervisorState::Idle | SupervisorState::Launching => {
                return Err(ProcessError::operation_not_allowed(
                    &self.inner.id,
                    "request_shutdown",
                    state.current_state().to_string(),
                ));
            }
        }

        let child = self.current_child(&state)?;
        info!(
            "Shutdown of {} requested with {}, grace period {:?}",
            child, signal, self.inner.grace_period
        );

        if signal == TerminationSignal::Interrupt {
            if let Err(e) = self.inner.adapter.forward_signal(&child, signal) {
                warn!("Failed to forward {} to {}: {}", signal, child, e);
            }
        }
        state.transition_to_terminating(format!("{} requested", signal))?;
        drop(state);

        self.spawn_escalation(child);
        Ok(ShutdownOutcome::Escalating)
    }

    /// Kill the child's group now, skipping any remaining grace period.
    pub fn force_kill(&self) -> ProcessResult<()> {
        let mut state = self.inner.state.lock();
        match state.current_state() {
            SupervisorState::Exited => return Ok(()),
            SupervisorState::Running | SupervisorState::Terminating => {}
            other => {
                return Err(ProcessError::operation_not_allowed(
                    &self.inner.id,
                    "force_kill",
                    other.to_string(),
                ));
            }
        }

        if let Some(task) = self.inner.escalation.lock().take() {
            task.abort();
        }

        let child = self.current_child(&state)?;
        info!("Force killing {}", child);
        self.inner.adapter.force_kill(&child);
        state.transition_to_terminating("Force kill requested")?;
        Ok(())
    }

    /// Block until the child exits and return its status.
    ///
    /// Safe to run concurrently with shutdown requests. Calling it again
    /// after exit returns the recorded status.
    pub async fn wait(&self) -> ProcessResult<ExitStatus> {
        self.inner.state.lock().require(
            "wait",
            &[
                SupervisorState::Running,
                SupervisorState::Terminating,
                SupervisorState::Exited,
            ],
        )?;

        let mut process = self.inner.process.lock().await;
        if let Some(status) = self.exit_status() {
            return Ok(status);
        }

        let child = match process.as_mut() {
            Some(child) => child,
            None => {
                return Err(ProcessError::wait_failed(
                    &self.inner.id,
                    "no child process was started",
                ))
            }
        };

        let status = child
            .wait()
            .await
            .map_err(|e| ProcessError::wait_failed(&self.inner.id, e.to_string()))?;

        // The pid is reaped: record the exit under the state lock before the
        // child is released, so no request can signal it afterwards.
        {
            let mut state = self.inner.state.lock();
            *self.inner.exit_status.lock() = Some(status);
            self.inner.exited.cancel();
            state.transition_to_exited(status.to_string())?;
        }
        *process = None;

        if status.success() {
            info!("Process {} exited successfully", self.inner.id);
        } else {
            warn!("Process {} exited with {}", self.inner.id, status);
        }
        Ok(status)
    }

    fn current_child(&self, state: &SupervisorStateMachine) -> ProcessResult<ChildHandle> {
        self.child().ok_or_else(|| {
            ProcessError::invalid_state(
                &self.inner.id,
                "a launched child",
                state.current_state().to_string(),
            )
        })
    }

    fn spawn_escalation(&self, child: ChildHandle) {
        let inner = Arc::clone(&self.inner);
        let exited = self.inner.exited.clone();
        let grace = self.inner.grace_period;

        let task = tokio::spawn(async move {
            inner.adapter.escalate_terminate(child, grace, exited).await;
        });
        debug!("Escalation task started for {}", child);
        *self.inner.escalation.lock() = Some(task);
    }
}
