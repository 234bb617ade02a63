//! `mc.yml`: which version to run and how.

use crate::atomic::write_atomic;
use anyhow::{bail, Context, Result};
use mcw_common::ServerVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "mc.yml";
pub const DEFAULT_MEMORY: &str = "2G";
pub const DEFAULT_PORT: u16 = 25565;

/// Persisted launcher settings.
///
/// ```yaml
/// version: 1.21.4
/// memory: 2G
/// port: 25565
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    pub version: ServerVersion,

    /// JVM max heap, passed as `-Xmx<memory>`
    #[serde(default = "default_memory")]
    pub memory: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl LauncherConfig {
    pub fn new(version: ServerVersion) -> Self {
        Self {
            version,
            memory: default_memory(),
            port: default_port(),
        }
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Load `mc.yml` from `dir`; `None` when the file does not exist.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path(dir);
        if !path.exists() {
            debug!("No {} in {}", CONFIG_FILE_NAME, dir.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::load_from_string(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(Some(config))
    }

    /// Parse and validate YAML content.
    pub fn load_from_string(content: &str) -> Result<Self> {
        let config: LauncherConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_memory(&self.memory) {
            bail!(
                "invalid memory '{}': expected a number with an optional K/M/G suffix",
                self.memory
            );
        }
        if self.port == 0 {
            bail!("port must be between 1 and 65535");
        }
        Ok(())
    }

    /// Write `mc.yml` into `dir` atomically.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        self.validate()?;
        let path = Self::path(dir);
        let yaml = serde_yaml::to_string(self).context("Failed to serialize configuration")?;
        write_atomic(&path, &yaml)?;
        debug!("Saved {}", path.display());
        Ok(path)
    }
}

fn is_valid_memory(memory: &str) -> bool {
    let digits = memory.trim_end_matches(|c: char| matches!(c, 'k' | 'K' | 'm' | 'M' | 'g' | 'G'));
    // At most one suffix character
    memory.len() - digits.len() <= 1
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
}

fn default_memory() -> String {
    DEFAULT_MEMORY.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
