//! # MCW Artifacts
//!
//! Everything needed to get a runnable server jar onto disk:
//! - [`local`]: which versions are already downloaded
//! - [`VersionResolver`]: newest published build of a version
//! - [`PackageDownloader`] / [`ArtifactFetcher`]: streaming download
//! - [`VersionChooser`]: picking among local versions interactively

pub mod api;
pub mod chooser;
pub mod download;
pub mod local;
pub mod resolver;

#[cfg(test)]
mod test_server;

pub use api::{PaperApi, DEFAULT_BASE_URL};
pub use chooser::{PromptChooser, Selection, VersionChooser};
pub use download::{ArtifactFetcher, DownloadTarget, PackageDownloader};
pub use local::{artifact_file_name, list_local_versions, parse_artifact_name};
pub use resolver::{latest_build, VersionResolver};
