//! # MCW Supervisor
//!
//! Runs the server as a child process and drives it through
//! `Idle -> Launching -> Running -> Terminating -> Exited`.
//!
//! ```rust,no_run
//! use mcw_common::TerminationSignal;
//! use mcw_supervisor::{LaunchSpec, ProcessSupervisor};
//! use std::path::Path;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let supervisor = ProcessSupervisor::new("paper");
//! let spec = LaunchSpec::java_server(Path::new("paper-1.21.4.jar"), "2G", ".");
//! supervisor.launch(&spec).await?;
//!
//! let stopper = supervisor.clone();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     let _ = stopper.request_shutdown(TerminationSignal::Interrupt);
//! });
//!
//! let status = supervisor.wait().await?;
//! println!("server exited with {}", status);
//! # Ok(())
//! # }
//! ```

pub mod launch;
pub mod supervisor;

pub use launch::{write_eula, LaunchSpec, EULA_CONTENTS, EULA_FILE_NAME};
pub use mcw_process_state::{StateTransition, SupervisorState};
pub use supervisor::{ProcessSupervisor, ShutdownOutcome};
