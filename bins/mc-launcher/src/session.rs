//! One `mc` invocation: pick a version, make sure its jar exists, run it.

use crate::java;
use crate::signals::ShutdownSignals;
use anyhow::{bail, Context, Result};
use mcw_artifacts::{
    artifact_file_name, ArtifactFetcher, PaperApi, PromptChooser, Selection, VersionChooser,
    VersionResolver,
};
use mcw_common::ServerVersion;
use mcw_config::{LauncherConfig, ServerProperties};
use mcw_supervisor::{LaunchSpec, ProcessSupervisor};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tempfile::TempDir;
use tracing::{info, warn};

/// Command-line choices for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub version: Option<String>,
    pub temp: bool,
    pub offline: bool,
    pub memory: Option<String>,
    pub port: Option<u16>,
}

pub struct Session {
    options: SessionOptions,
    /// Holds mc.yml and the downloaded jars
    cache_dir: PathBuf,
    api: PaperApi,
    resolver: VersionResolver,
}

impl Session {
    pub fn new(options: SessionOptions, cache_dir: PathBuf) -> Self {
        let api = PaperApi::default();
        Self {
            options,
            cache_dir,
            resolver: VersionResolver::new(api.clone()),
            api,
        }
    }

    /// Run the whole session and return the process exit code.
    pub async fn run(&self) -> Result<i32> {
        java::validate_java().await?;

        let stdin = io::stdin();
        let config = {
            let mut input = stdin.lock();
            let mut output = io::stdout();
            self.resolve_config(&mut input, &mut output)?
        };
        let Some(config) = config else {
            info!("Version selection cancelled");
            return Ok(0);
        };

        let jar = self.ensure_artifact(&config.version).await?;

        // Dropped at the end of the session, removing the directory.
        let temp_dir = if self.options.temp {
            Some(TempDir::new().context("Failed to create temporary server directory")?)
        } else {
            None
        };
        let run_dir = temp_dir
            .as_ref()
            .map(|d| d.path().to_path_buf())
            .unwrap_or_else(|| self.cache_dir.clone());

        configure_server(&run_dir, config.port, self.options.offline)?;

        println!("Starting Minecraft server {}...", config.version);
        let spec = LaunchSpec::java_server(&jar, &config.memory, &run_dir);
        let status = supervise(&spec).await?;

        if let Some(dir) = temp_dir {
            if let Err(e) = dir.close() {
                warn!("Failed to remove temporary directory: {}", e);
            }
        }
        Ok(exit_code(status))
    }

    /// Decide which version to run. `None` means the user cancelled.
    fn resolve_config<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<LauncherConfig>> {
        let existing = LauncherConfig::load(&self.cache_dir)?;

        let requested = match (&self.options.version, &existing) {
            (Some(version), _) => Some(version.clone()),
            (None, None) => Some(prompt_for_version(input, output)?),
            (None, Some(_)) => None,
        };

        if let Some(requested) = requested {
            let version = ServerVersion::parse(&requested)?;
            let mut config = LauncherConfig::new(version);
            if let Some(previous) = &existing {
                config.memory = previous.memory.clone();
                config.port = previous.port;
            }
            self.apply_overrides(&mut config);
            config.save(&self.cache_dir)?;
            return Ok(Some(config));
        }

        let Some(mut config) = existing else {
            return Ok(None);
        };
        self.apply_overrides(&mut config);
        config.validate()?;

        let versions = self.resolver.list_local_versions(&self.cache_dir)?;
        if versions.len() > 1 {
            let mut chooser = PromptChooser::new(input, output);
            match chooser.choose(&versions)? {
                Selection::Chosen(version) => config.version = version,
                Selection::Cancelled => return Ok(None),
            }
        }
        Ok(Some(config))
    }

    fn apply_overrides(&self, config: &mut LauncherConfig) {
        if let Some(memory) = &self.options.memory {
            config.memory = memory.clone();
        }
        if let Some(port) = self.options.port {
            config.port = port;
        }
    }

    /// Path of the jar for `version`, downloading it if absent.
    async fn ensure_artifact(&self, version: &ServerVersion) -> Result<PathBuf> {
        let jar = self.cache_dir.join(artifact_file_name(version));
        if jar.exists() {
            return Ok(jar);
        }

        println!("Downloading Paper {}...", version);
        let fetcher = ArtifactFetcher::new(self.api.clone());
        let target = fetcher
            .fetch_artifact(version.as_str(), &jar)
            .await
            .with_context(|| format!("Failed to download Paper {}", version))?;
        info!(build = %target.build, "Downloaded {}", target.destination.display());
        Ok(jar)
    }
}

fn prompt_for_version<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "No mc.yml found. Enter Minecraft version (e.g., 1.21.4): ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let version = line.trim();
    if version.is_empty() {
        bail!("No version specified");
    }
    Ok(version.to_string())
}

/// Write the port and online-mode into `server.properties` in `dir`.
fn configure_server(dir: &Path, port: u16, offline: bool) -> Result<()> {
    let mut properties = ServerProperties::in_dir(dir)?;
    properties.set("server-port", &port.to_string());
    properties.set("online-mode", if offline { "false" } else { "true" });
    properties.save()
}

/// Launch `spec` and relay shutdown signals until the server exits.
///
/// The first SIGINT/SIGTERM starts a graceful shutdown, the next one kills.
async fn supervise(spec: &LaunchSpec) -> Result<ExitStatus> {
    let mut signals = ShutdownSignals::install().context("Failed to install signal handlers")?;

    let supervisor = ProcessSupervisor::new("paper");
    supervisor.launch(spec).await?;

    let mut waiter = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.wait().await })
    };

    loop {
        tokio::select! {
            result = &mut waiter => {
                let status = result.context("Supervisor wait task failed")??;
                return Ok(status);
            }
            Some(signal) = signals.recv() => {
                match supervisor.request_shutdown(signal) {
                    Ok(outcome) => info!("Received {}: {:?}", signal, outcome),
                    Err(e) => warn!("Shutdown request failed: {}", e),
                }
            }
        }
    }
}

/// Exit code to report for the server's exit status.
///
/// Death by signal maps to `128 + signo`, as shells do.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcw_common::LaunchError;
    use std::io::Cursor;

    fn session(dir: &TempDir, version: Option<&str>) -> Session {
        let options = SessionOptions {
            version: version.map(str::to_string),
            ..Default::default()
        };
        Session::new(options, dir.path().to_path_buf())
    }

    fn resolve(session: &Session, input: &str) -> Result<Option<LauncherConfig>> {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        session.resolve_config(&mut input, &mut output)
    }

    fn save_config(dir: &TempDir, version: &str, memory: &str) {
        let mut config = LauncherConfig::new(ServerVersion::parse(version).unwrap());
        config.memory = memory.to_string();
        config.save(dir.path()).unwrap();
    }

    fn touch_jars(dir: &TempDir, versions: &[&str]) {
        for v in versions {
            std::fs::write(dir.path().join(format!("paper-{}.jar", v)), b"").unwrap();
        }
    }

    #[test]
    fn test_version_argument_is_saved() {
        let dir = TempDir::new().unwrap();
        let config = resolve(&session(&dir, Some("1.21.4")), "").unwrap().unwrap();

        assert_eq!(config.version.as_str(), "1.21.4");
        assert_eq!(config.memory, "2G");
        assert_eq!(config.port, 25565);

        let saved = LauncherConfig::load(dir.path()).unwrap().unwrap();
        assert_eq!(saved, config);
    }

    #[test]
    fn test_version_argument_keeps_configured_memory() {
        let dir = TempDir::new().unwrap();
        save_config(&dir, "1.20.6", "6G");

        let config = resolve(&session(&dir, Some("1.21.4")), "").unwrap().unwrap();
        assert_eq!(config.version.as_str(), "1.21.4");
        assert_eq!(config.memory, "6G");
    }

    #[test]
    fn test_invalid_version_argument() {
        let dir = TempDir::new().unwrap();
        let err = resolve(&session(&dir, Some("1.2.3.4")), "").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LaunchError>(),
            Some(LaunchError::InvalidVersion { .. })
        ));
        assert!(LauncherConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_prompt_when_unconfigured() {
        let dir = TempDir::new().unwrap();
        let config = resolve(&session(&dir, None), "1.20.6\n").unwrap().unwrap();

        assert_eq!(config.version.as_str(), "1.20.6");
        assert!(LauncherConfig::load(dir.path()).unwrap().is_some());
    }

    #[test]
    fn test_empty_prompt_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(resolve(&session(&dir, None), "\n").is_err());
    }

    #[test]
    fn test_single_local_jar_skips_chooser() {
        let dir = TempDir::new().unwrap();
        save_config(&dir, "1.21.4", "2G");
        touch_jars(&dir, &["1.21.4"]);

        // Input would cancel if the chooser ran
        let config = resolve(&session(&dir, None), "q\n").unwrap().unwrap();
        assert_eq!(config.version.as_str(), "1.21.4");
    }

    #[test]
    fn test_chooser_picks_among_local_jars() {
        let dir = TempDir::new().unwrap();
        save_config(&dir, "1.21.4", "2G");
        touch_jars(&dir, &["1.21.4", "1.20.6", "1.19.2"]);

        let config = resolve(&session(&dir, None), "3\n").unwrap().unwrap();
        assert_eq!(config.version.as_str(), "1.19.2");
    }

    #[test]
    fn test_chooser_cancel_ends_session() {
        let dir = TempDir::new().unwrap();
        save_config(&dir, "1.21.4", "2G");
        touch_jars(&dir, &["1.21.4", "1.20.6"]);

        assert!(resolve(&session(&dir, None), "q\n").unwrap().is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let dir = TempDir::new().unwrap();
        save_config(&dir, "1.21.4", "2G");
        let options = SessionOptions {
            memory: Some("8G".to_string()),
            port: Some(25600),
            ..Default::default()
        };
        let session = Session::new(options, dir.path().to_path_buf());

        let config = resolve(&session, "").unwrap().unwrap();
        assert_eq!(config.memory, "8G");
        assert_eq!(config.port, 25600);
    }

    #[test]
    fn test_configure_server() {
        let dir = TempDir::new().unwrap();

        configure_server(dir.path(), 25570, true).unwrap();
        configure_server(dir.path(), 25570, false).unwrap();

        let properties = ServerProperties::in_dir(dir.path()).unwrap();
        assert_eq!(properties.get("server-port"), Some("25570"));
        assert_eq!(properties.get("online-mode"), Some("true"));

        let content = std::fs::read_to_string(properties.path()).unwrap();
        assert_eq!(content.matches("online-mode=").count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }
}
