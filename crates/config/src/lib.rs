//! User configuration for blinders: engine timing, overlay appearance and
//! permission prompts.
//!
//! Configuration lives in an optional RON file (`~/.blinders.ron` by
//! default). Every field has a default, so an empty file or no file at all
//! yields a usable [`Config`].
#![warn(unsafe_op_in_unsafe_fn)]

use std::{
    env,
    path::{Path, PathBuf},
};

mod defaults;
mod error;
mod loader;
mod types;

#[cfg(test)]
mod test_parse;

pub use error::Error;
pub use loader::{load_from_path, load_from_str, to_ron_string};
pub use types::{Config, EngineSettings, OverlayStyle, PermissionSettings, Rgba};

/// Determine the preferred user config path (`~/.blinders.ron`).
pub fn default_config_path() -> PathBuf {
    let mut p = PathBuf::from(env::var_os("HOME").unwrap_or_default());
    p.push(".blinders.ron");
    p
}

/// Resolve and load the effective configuration.
///
/// Policy:
/// 1) Load `explicit` when provided; a missing explicit file is an error.
/// 2) Else load `~/.blinders.ron` when it exists.
/// 3) Else fall back to built-in defaults.
pub fn resolve_and_load(explicit: Option<&Path>) -> Result<Config, Error> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    let preferred = default_config_path();
    if preferred.exists() {
        return load_from_path(&preferred);
    }
    tracing::debug!(path = %preferred.display(), "no config file; using defaults");
    Ok(Config::default())
}
