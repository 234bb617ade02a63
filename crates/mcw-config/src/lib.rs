//! # MCW Config
//!
//! On-disk configuration of the launcher:
//! - [`LauncherConfig`]: `mc.yml` (version, heap size, port)
//! - [`ServerProperties`]: minimal editor for the server's `server.properties`
//!
//! Both are rewritten through a temp file and a rename.

pub mod atomic;
pub mod launcher;
pub mod properties;

pub use launcher::{LauncherConfig, CONFIG_FILE_NAME, DEFAULT_MEMORY, DEFAULT_PORT};
pub use properties::{set_property, ServerProperties, SERVER_PROPERTIES_FILE_NAME};
