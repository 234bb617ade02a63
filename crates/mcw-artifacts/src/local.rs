//! Discovery of server jars already present on disk.

use mcw_common::{LaunchError, LaunchResult, ServerVersion};
use std::path::Path;
use tracing::debug;

const ARTIFACT_PREFIX: &str = "paper-";
const ARTIFACT_SUFFIX: &str = ".jar";

/// `paper-<version>.jar`
pub fn artifact_file_name(version: &ServerVersion) -> String {
    format!("{}{}{}", ARTIFACT_PREFIX, version, ARTIFACT_SUFFIX)
}

/// Extract the version from a local artifact file name.
///
/// Returns `None` for anything that is not `paper-<valid version>.jar`.
pub fn parse_artifact_name(file_name: &str) -> Option<ServerVersion> {
    let version = file_name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(ARTIFACT_SUFFIX)?;
    ServerVersion::parse(version).ok()
}

/// Versions of every local artifact in `dir`, newest first.
///
/// Files whose version part does not validate are skipped.
pub fn list_local_versions(dir: &Path) -> LaunchResult<Vec<ServerVersion>> {
    let entries = std::fs::read_dir(dir).map_err(|e| LaunchError::io(dir, e))?;

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LaunchError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        match parse_artifact_name(name) {
            Some(version) => versions.push(version),
            None if name.ends_with(ARTIFACT_SUFFIX) => {
                debug!("Ignoring jar with unrecognized name: {}", name)
            }
            None => {}
        }
    }

    versions.sort_by(|a, b| b.cmp(a));
    Ok(versions)
}
