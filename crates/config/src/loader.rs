//! Parse and load user configuration.

use std::{fs, path::Path};

use ron::ser::PrettyConfig;

use crate::{Config, Error};

/// Load and validate a `Config` from the RON file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    let cfg = load_from_str(&text).map_err(|e| e.with_path(path))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

/// Parse and validate a `Config` from RON text.
pub fn load_from_str(text: &str) -> Result<Config, Error> {
    // An empty file means "all defaults".
    if text.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = ron::from_str(text).map_err(|e| Error::Parse {
        path: None,
        message: e.to_string(),
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Render a configuration as pretty RON.
pub fn to_ron_string(cfg: &Config) -> Result<String, Error> {
    ron::ser::to_string_pretty(cfg, PrettyConfig::default()).map_err(|e| Error::Parse {
        path: None,
        message: e.to_string(),
    })
}
