//! # MCW Process
//!
//! Low-level process-group operations for the server supervisor.
//!
//! This crate provides the [`SignalAdapter`] contract and exactly one
//! implementation per target family:
//! - [`UnixSignalAdapter`]: the child leads its own process group and every
//!   signal is delivered to the whole group.
//! - [`WindowsSignalAdapter`]: no process-group primitive; the child is
//!   tracked individually and group operations degrade to single-process
//!   operations.
//!
//! [`PlatformSignalAdapter`] names whichever one is linked for the current
//! target, so shared code never branches on the platform at runtime.

pub mod adapter;
pub mod handle;

#[cfg(unix)]
pub mod signal_unix;

#[cfg(windows)]
pub mod signal_windows;

#[cfg(not(any(unix, windows)))]
compile_error!("mcw-process supports only unix and windows targets");

// Re-export main types
pub use adapter::SignalAdapter;
pub use handle::ChildHandle;

#[cfg(unix)]
pub use signal_unix::UnixSignalAdapter;

#[cfg(windows)]
pub use signal_windows::WindowsSignalAdapter;

/// The signal adapter linked for the current target.
#[cfg(unix)]
pub type PlatformSignalAdapter = UnixSignalAdapter;

/// The signal adapter linked for the current target.
#[cfg(windows)]
pub type PlatformSignalAdapter = WindowsSignalAdapter;
