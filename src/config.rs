//! Optional `cnav.toml` configuration
//!
//! Holds defaults the CLI falls back to when flags are omitted: the
//! source root to index and exclude patterns. A missing file is not an
//! error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NavConfig {
    /// Default source root for `index`/`resolve`/`usages`
    pub root: Option<String>,
    /// Default exclude patterns (regexes, partial path match)
    pub excludes: Option<Vec<String>>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("cnav.toml")
}

/// Load the config at `path` (or `cnav.toml`); `Ok(None)` when absent.
pub fn load_config(path: Option<&Path>) -> Result<Option<NavConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: NavConfig =
        toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
    Ok(Some(config))
}
