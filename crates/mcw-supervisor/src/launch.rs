//! What to launch, and the files that must exist before launching it.

use mcw_common::{LaunchError, LaunchResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// License-acceptance marker the server refuses to start without.
pub const EULA_FILE_NAME: &str = "eula.txt";

pub const EULA_CONTENTS: &str = "# Minecraft EULA\n# Auto-accepted by mc utility\neula=true\n";

/// Executable, arguments and working directory of the supervised child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub executable: OsString,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
}

impl LaunchSpec {
    pub fn new(executable: impl Into<OsString>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// `java -Xmx<memory> -jar <jar> nogui`
    pub fn java_server(jar: &Path, memory: &str, working_dir: impl Into<PathBuf>) -> Self {
        Self::new("java", working_dir)
            .arg(format!("-Xmx{}", memory))
            .arg("-jar")
            .arg(jar.as_os_str())
            .arg("nogui")
    }
}

/// Write the EULA marker into `dir`, overwriting any previous content.
pub fn write_eula(dir: &Path) -> LaunchResult<PathBuf> {
    let path = dir.join(EULA_FILE_NAME);
    std::fs::write(&path, EULA_CONTENTS).map_err(|e| LaunchError::io(&path, e))?;
    Ok(path)
}
