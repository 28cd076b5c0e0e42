//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config file read when `--config` is not given. A missing file means defaults.
pub const DEFAULT_CONFIG: &str = "etc/panrig.toml";

#[derive(Parser, Debug)]
#[command(name = "panrig", version, about = "Webcam pan platform controller")]
pub struct Cli {
    /// Path to config TOML (default: etc/panrig.toml, optional)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of pretty; errors are printed as JSON too
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the command server and the control loop until Ctrl-C
    Run {
        /// Listen address (overrides [server].bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
        /// Skip the startup blink-and-sweep confirmation
        #[arg(long, action = ArgAction::SetTrue)]
        no_self_test: bool,
        /// Stop after this many ticks (also bounds the halt blink loop)
        #[arg(long, value_name = "N")]
        max_ticks: Option<u64>,
    },
    /// Build the controller, run a few ticks and query status
    SelfCheck,
    /// Print the status document as one JSON line
    Health,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::parse_from([
            "panrig",
            "--json",
            "run",
            "--bind",
            "127.0.0.1:0",
            "--no-self-test",
            "--max-ticks",
            "7",
        ]);
        assert!(cli.json);
        match cli.cmd {
            Commands::Run {
                bind,
                no_self_test,
                max_ticks,
            } => {
                assert_eq!(bind.as_deref(), Some("127.0.0.1:0"));
                assert!(no_self_test);
                assert_eq!(max_ticks, Some(7));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
