use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

mod java;
mod session;
mod signals;

use session::{Session, SessionOptions};

/// Download, launch and supervise a Paper Minecraft server
#[derive(Parser, Debug)]
#[command(
    name = "mc",
    version = concat!("version ", env!("CARGO_PKG_VERSION")),
    about,
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Minecraft version to run (e.g. 1.21.4); saved to mc.yml
    #[arg(id = "mc_version", value_name = "VERSION")]
    version: Option<String>,

    /// Run the server in a throwaway directory deleted afterwards
    #[arg(long)]
    temp: bool,

    /// Start with online-mode=false
    #[arg(long)]
    offline: bool,

    /// JVM max heap (e.g. 4G); overrides mc.yml
    #[arg(short, long)]
    memory: Option<String>,

    /// Server port; overrides mc.yml
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Check that java is installed and can allocate a 1G heap
    #[command(alias = "test")]
    CheckJava,
}

impl Args {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            version: self.version.clone(),
            temp: self.temp,
            offline: self.offline,
            memory: self.memory.clone(),
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.debug)?;
    debug!("Arguments: {:?}", args);

    let code = match args.command {
        Some(Commands::CheckJava) => java::check_java().await?,
        None => {
            let cache_dir = std::env::current_dir()?;
            Session::new(args.session_options(), cache_dir).run().await?
        }
    };

    std::process::exit(code);
}

fn initialize_logging(debug: bool) -> Result<()> {
    // The server owns stdout; keep our own diagnostics quiet and on stderr.
    let level = if debug { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_flags_and_positional() {
        let args = Args::try_parse_from(["mc", "--temp", "--offline", "1.21.4"]).unwrap();
        assert!(args.temp);
        assert!(args.offline);
        assert_eq!(args.version.as_deref(), Some("1.21.4"));
        assert!(args.command.is_none());
    }

    #[test]
    fn test_flags_after_positional() {
        let args = Args::try_parse_from(["mc", "1.20", "--memory", "4G", "--port", "25570"]).unwrap();
        assert_eq!(args.version.as_deref(), Some("1.20"));
        assert_eq!(args.memory.as_deref(), Some("4G"));
        assert_eq!(args.port, Some(25570));
        assert!(!args.temp);
    }

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["mc"]).unwrap();
        assert!(args.version.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_version_flag() {
        let err = Args::try_parse_from(["mc", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
        assert!(err.to_string().starts_with("mc version "));
    }

    #[test]
    fn test_check_java_subcommand() {
        let args = Args::try_parse_from(["mc", "check-java"]).unwrap();
        assert_eq!(args.command, Some(Commands::CheckJava));

        let args = Args::try_parse_from(["mc", "test"]).unwrap();
        assert_eq!(args.command, Some(Commands::CheckJava));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Args::try_parse_from(["mc", "--port", "70000"]).is_err());
    }

    #[test]
    fn test_session_options() {
        let args = Args::try_parse_from(["mc", "1.21.4", "--offline"]).unwrap();
        let options = args.session_options();
        assert_eq!(options.version.as_deref(), Some("1.21.4"));
        assert!(options.offline);
        assert!(!options.temp);
    }
}
