//! `fielder.toml` project configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::coordinator::InsertionPolicy;
use crate::error::FielderError;

pub const CONFIG_FILE: &str = "fielder.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FielderConfig {
    #[serde(default)]
    pub fielder: FielderSettings,
    #[serde(default)]
    pub paths: PathSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FielderSettings {
    #[serde(default)]
    pub insertion: InsertionPolicy,
    /// Treat warning diagnostics as failures.
    #[serde(default)]
    pub deny_warnings: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_scan")]
    pub scan: Vec<PathBuf>,
    /// Path components that exclude a file from scanning.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            scan: default_scan(),
            exclude: default_exclude(),
        }
    }
}

fn default_scan() -> Vec<PathBuf> {
    vec![PathBuf::from("src")]
}

fn default_exclude() -> Vec<String> {
    vec!["generated".to_string(), "target".to_string()]
}

impl FielderConfig {
    pub fn load(path: &Path) -> Result<Self, FielderError> {
        let content = std::fs::read_to_string(path).map_err(|source| FielderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| FielderError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look for `fielder.toml` in `start` and its ancestors, stopping at the
    /// first directory that holds a `Cargo.toml`.
    pub fn discover(start: &Path) -> Result<Option<(PathBuf, Self)>, FielderError> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                log::debug!("loaded {}", candidate.display());
                return Ok(Some((candidate, config)));
            }
            if current.join("Cargo.toml").exists() || !current.pop() {
                return Ok(None);
            }
        }
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|component| {
            let component = component.as_os_str().to_string_lossy();
            self.paths.exclude.iter().any(|excluded| *excluded == component)
        })
    }
}
