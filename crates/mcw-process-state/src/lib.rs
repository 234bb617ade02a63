//! # MCW Process State
//!
//! Lifecycle state machine for the supervised server process:
//! `Idle -> Launching -> Running -> Terminating -> Exited`.

use chrono::{DateTime, Utc};
use mcw_common::errors::{ProcessError, ProcessResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of transitions kept in the history.
const HISTORY_LIMIT: usize = 32;

/// Lifecycle state of the supervised child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisorState {
    /// Nothing launched yet
    Idle,
    /// Spawn in progress
    Launching,
    /// Child is running and no shutdown was requested
    Running,
    /// A shutdown was requested; waiting for the child to exit
    Terminating,
    /// The OS process is gone (or never started)
    Exited,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Idle => write!(f, "idle"),
            SupervisorState::Launching => write!(f, "launching"),
            SupervisorState::Running => write!(f, "running"),
            SupervisorState::Terminating => write!(f, "terminating"),
            SupervisorState::Exited => write!(f, "exited"),
        }
    }
}

impl SupervisorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SupervisorState::Exited)
    }

    /// True while an OS process may exist.
    pub fn has_child(&self) -> bool {
        matches!(self, SupervisorState::Running | SupervisorState::Terminating)
    }
}

/// A recorded state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: SupervisorState,
    pub to_state: SupervisorState,
    pub timestamp: DateTime<Utc>,
    pub reason: Option<String>,
}

/// State machine guarding every supervisor operation.
#[derive(Debug, Clone)]
pub struct SupervisorStateMachine {
    process_id: String,
    current_state: SupervisorState,
    state_history: Vec<StateTransition>,
}

impl SupervisorStateMachine {
    pub fn new(process_id: &str) -> Self {
        Self {
            process_id: process_id.to_string(),
            current_state: SupervisorState::Idle,
            state_history: Vec::new(),
        }
    }

    pub fn current_state(&self) -> SupervisorState {
        self.current_state
    }

    pub fn state_history(&self) -> &[StateTransition] {
        &self.state_history
    }

    /// Check if a transition from the current state to `target_state` is valid
    pub fn is_valid_transition(&self, target_state: SupervisorState) -> bool {
        use SupervisorState::*;

        match (self.current_state, target_state) {
            (Idle, Launching) => true,

            (Launching, Running) => true,
            // Spawn failure
            (Launching, Exited) => true,

            (Running, Terminating) => true,
            (Running, Exited) => true,

            (Terminating, Exited) => true,

            // Same state (no-op)
            (state, target) if state == target => true,

            _ => false,
        }
    }

    /// Transition to a new state with an optional reason
    pub fn transition_to(
        &mut self,
        target_state: SupervisorState,
        reason: Option<String>,
    ) -> ProcessResult<()> {
        if !self.is_valid_transition(target_state) {
            return Err(ProcessError::invalid_state(
                &self.process_id,
                target_state.to_string(),
                self.current_state.to_string(),
            ));
        }

        if target_state == self.current_state {
            return Ok(());
        }

        let now = Utc::now();
        let previous = self.current_state;
        self.state_history.push(StateTransition {
            from_state: previous,
            to_state: target_state,
            timestamp: now,
            reason,
        });
        if self.state_history.len() > HISTORY_LIMIT {
            self.state_history.remove(0);
        }

        self.current_state = target_state;

        tracing::debug!(
            "Process {} transitioned from {} to {}",
            self.process_id,
            previous,
            self.current_state
        );

        Ok(())
    }

    pub fn transition_to_launching(&mut self) -> ProcessResult<()> {
        self.transition_to(
            SupervisorState::Launching,
            Some("Launch requested".to_string()),
        )
    }

    pub fn transition_to_running(&mut self, pid: u32) -> ProcessResult<()> {
        self.transition_to(
            SupervisorState::Running,
            Some(format!("Spawned with pid {}", pid)),
        )
    }

    pub fn transition_to_terminating(&mut self, reason: impl Into<String>) -> ProcessResult<()> {
        self.transition_to(SupervisorState::Terminating, Some(reason.into()))
    }

    pub fn transition_to_exited(&mut self, reason: impl Into<String>) -> ProcessResult<()> {
        self.transition_to(SupervisorState::Exited, Some(reason.into()))
    }

    /// Reject `operation` unless the machine is in one of `allowed`.
    pub fn require(&self, operation: &str, allowed: &[SupervisorState]) -> ProcessResult<()> {
        if allowed.contains(&self.current_state) {
            Ok(())
        } else {
            Err(ProcessError::operation_not_allowed(
                &self.process_id,
                operation,
                self.current_state.to_string(),
            ))
        }
    }
}
