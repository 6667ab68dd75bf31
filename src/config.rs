use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::timer::Strategy;

/// Optional user preferences. The idle timeout is deliberately not among them.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub strategy: Option<Strategy>,
    pub log_file: Option<PathBuf>,
}

/// Effective settings after merging command line flags over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub strategy: Strategy,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(
        cli_strategy: Option<Strategy>,
        cli_log_file: Option<PathBuf>,
        config: Config,
    ) -> Self {
        Self {
            strategy: cli_strategy.or(config.strategy).unwrap_or_default(),
            log_file: cli_log_file.or(config.log_file),
        }
    }
}

pub trait ConfigSource {
    fn load(&self) -> Result<Config>;
}

/// Read-only JSON config in the platform config directory
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "blankpage") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("blankpage_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like `load`, but falls back to defaults when the file is unusable
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring config: {}", e);
                Config::default()
            }
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for FileConfigStore {
    fn load(&self) -> Result<Config> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|source| AppError::Config {
            path: self.path.clone(),
            source,
        })
    }
}
