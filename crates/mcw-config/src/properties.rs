//! Line-preserving editor for `server.properties`.
//!
//! Only the line for the key being set is touched. Comments, blank lines
//! and the order of every other line survive a rewrite unchanged.

use crate::atomic::write_atomic;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const SERVER_PROPERTIES_FILE_NAME: &str = "server.properties";

#[derive(Debug, Clone)]
pub struct ServerProperties {
    path: PathBuf,
    lines: Vec<String>,
}

impl ServerProperties {
    /// Load the file at `path`; a missing file yields an empty document.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lines = if path.exists() {
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?
                .lines()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        Ok(Self { path, lines })
    }

    /// `server.properties` inside `dir`.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::load(dir.join(SERVER_PROPERTIES_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match split_entry(line) {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        })
    }

    /// Set `key` to `value`, replacing its line in place or appending one.
    ///
    /// Duplicate lines for `key` left by hand edits are collapsed into the
    /// first occurrence.
    pub fn set(&mut self, key: &str, value: &str) {
        let entry = format!("{}={}", key, value);
        let mut replaced = false;

        self.lines.retain_mut(|line| {
            if !matches!(split_entry(line), Some((k, _)) if k == key) {
                return true;
            }
            if replaced {
                return false;
            }
            *line = entry.clone();
            replaced = true;
            true
        });

        if !replaced {
            self.lines.push(entry);
        }
    }

    pub fn to_file_string(&self) -> String {
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }

    pub fn save(&self) -> Result<()> {
        write_atomic(&self.path, &self.to_file_string())
    }
}

/// Load, set one key and save.
pub fn set_property(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut properties = ServerProperties::load(path)?;
    properties.set(key, value);
    properties.save()
}

/// `key=value` split of a non-comment line.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim_end(), value.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_create_and_update() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SERVER_PROPERTIES_FILE_NAME);

        set_property(&path, "online-mode", "false").unwrap();
        assert_eq!(read(&path), "online-mode=false\n");

        set_property(&path, "server-port", "25566").unwrap();
        set_property(&path, "online-mode", "true").unwrap();

        let content = read(&path);
        assert_eq!(content.matches("online-mode=").count(), 1);
        assert_eq!(content, "online-mode=true\nserver-port=25566\n");
    }

    #[test]
    fn test_other_lines_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SERVER_PROPERTIES_FILE_NAME);
        std::fs::write(
            &path,
            "#Minecraft server properties\n\
             motd=A Minecraft Server\n\
             # online-mode=commented\n\
             online-mode=true\n\
             \n\
             max-players=20\n",
        )
        .unwrap();

        set_property(&path, "online-mode", "false").unwrap();

        assert_eq!(
            read(&path),
            "#Minecraft server properties\n\
             motd=A Minecraft Server\n\
             # online-mode=commented\n\
             online-mode=false\n\
             \n\
             max-players=20\n"
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SERVER_PROPERTIES_FILE_NAME);
        std::fs::write(&path, "server-port=1\nlevel-name=world\nserver-port=2\n").unwrap();

        set_property(&path, "server-port", "25565").unwrap();

        assert_eq!(read(&path), "server-port=25565\nlevel-name=world\n");
    }

    #[test]
    fn test_get() {
        let mut properties = ServerProperties::load("/nonexistent/server.properties").unwrap();
        assert_eq!(properties.get("motd"), None);

        properties.set("motd", "hello=world");
        properties.set("gamemode", "survival");
        assert_eq!(properties.get("motd"), Some("hello=world"));
        assert_eq!(properties.get("gamemode"), Some("survival"));
        assert_eq!(properties.get("game"), None);
    }

    #[test]
    fn test_comment_lines_are_not_keys() {
        assert_eq!(split_entry("#online-mode=true"), None);
        assert_eq!(split_entry("!online-mode=true"), None);
        assert_eq!(split_entry(""), None);
        assert_eq!(split_entry("online-mode = true"), Some(("online-mode", "true")));
    }
}
