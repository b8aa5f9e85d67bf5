//! Binary entrypoint for the Blinders menu bar app.
#![cfg_attr(not(target_os = "macos"), allow(dead_code))]
use std::{
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use tracing::{debug, error};

/// Event loop wiring between AppKit, the tray and the engine.
#[cfg(target_os = "macos")]
mod app;
/// Engine collaborators backed by mac-winops and permissions.
#[cfg(target_os = "macos")]
mod platform;
/// Screen Recording permission alert.
#[cfg(target_os = "macos")]
mod prompt;
/// Menu text derived from session snapshots.
mod status;
#[cfg(target_os = "macos")]
mod tray;

#[derive(Parser, Debug)]
#[command(
    name = "blinders",
    about = "Focus sessions that cover distracting windows",
    version
)]
/// Command-line interface for the `blinders` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.blinders.ron)
        path: Option<PathBuf>,

        /// Dump the effective configuration as RON to stdout
        #[arg(long)]
        dump: bool,
    },
}

/// Validate (and optionally print) the configuration, returning the exit code.
fn check(explicit: Option<&Path>, dump: bool) -> i32 {
    let cfg = match config::resolve_and_load(explicit) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e.pretty());
            return 1;
        }
    };
    if !dump {
        println!("OK");
        return 0;
    }
    match config::to_ron_string(&cfg) {
        Ok(text) => {
            println!("{text}");
            0
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e.pretty());
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log.spec());

    if let Some(Command::Check { path, dump }) = &cli.command {
        let explicit = path.as_deref().or(cli.config.as_deref());
        process::exit(check(explicit, *dump));
    }

    let cfg = match config::resolve_and_load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", e.pretty());
            process::exit(1);
        }
    };
    debug!(?cfg, "effective config");

    #[cfg(target_os = "macos")]
    app::run(cfg);

    #[cfg(not(target_os = "macos"))]
    {
        error!("blinders only runs on macOS");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_subcommand_parses() {
        let cli = Cli::parse_from(["blinders", "--debug", "check", "/tmp/x.ron", "--dump"]);
        assert!(cli.log.debug);
        match cli.command {
            Some(Command::Check { path, dump }) => {
                assert_eq!(path.as_deref(), Some(Path::new("/tmp/x.ron")));
                assert!(dump);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn log_flags_conflict() {
        assert!(Cli::try_parse_from(["blinders", "--trace", "--debug"]).is_err());
    }

    #[test]
    fn check_reports_missing_explicit_file() {
        assert_eq!(check(Some(Path::new("/nonexistent/blinders.ron")), false), 1);
    }
}
