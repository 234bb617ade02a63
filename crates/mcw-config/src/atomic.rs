use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Write `contents` to `path` through a sibling temp file and a rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = temp_path_for(path);

    std::fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
