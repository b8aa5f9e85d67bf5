#![warn(missing_docs)]

//! Shared logging helpers, CLI argument definitions, and tracing setup for the blinders workspace.
//!
//! - [`LogArgs`]: clap flags for log level configuration
//! - [`compute_spec`]: resolve the effective filter directive
//! - [`init`]: install the process-wide subscriber

use std::env;

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "blinders_engine=trace,mac_winops=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Effective filter spec for these flags, consulting `RUST_LOG` as a fallback.
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        // App and core crates
        "blinders",
        "blinders_engine",
        "config",
        // macOS integration crates
        "mac_focus_watcher",
        "mac_winops",
        // Utilities
        "permissions",
        "logging",
    ]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    spec_with_env(
        trace,
        debug,
        log_level,
        log_filter,
        env::var("RUST_LOG").ok(),
    )
}

/// Precedence resolution with the environment value passed in explicitly.
fn spec_with_env(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    rust_log: Option<String>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    match rust_log {
        Some(spec) if !spec.trim().is_empty() => spec,
        _ => level_spec_for("info"),
    }
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// Install the global subscriber: env filter plus compact fmt output without timestamps.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(spec: &str) {
    tracing_subscriber::registry()
        .with(env_filter_from_spec(spec))
        .with(fmt::layer().without_time())
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let s = spec_with_env(true, false, Some("warn"), Some("x=trace"), Some("y=debug".into()));
        assert_eq!(s, "x=trace");
    }

    #[test]
    fn level_flags_scope_to_our_crates() {
        let s = spec_with_env(false, true, None, None, None);
        assert!(s.contains("blinders_engine=debug"));
        assert!(s.contains("mac_winops=debug"));
        assert!(!s.contains("info"));
    }

    #[test]
    fn log_level_is_lowercased() {
        let s = spec_with_env(false, false, Some("WARN"), None, None);
        assert!(s.split(',').all(|d| d.ends_with("=warn")));
    }

    #[test]
    fn env_used_when_no_flags() {
        let s = spec_with_env(false, false, None, None, Some("blinders=trace".into()));
        assert_eq!(s, "blinders=trace");
    }

    #[test]
    fn defaults_to_info() {
        let s = spec_with_env(false, false, None, None, Some("  ".into()));
        assert_eq!(s, level_spec_for("info"));
    }
}
