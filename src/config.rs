use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    app_dirs::AppDirs,
    session::{SessionConfig, DEFAULT_DURATION_SECS, DEFAULT_NUMBER_OF_WORDS},
};

/// Persisted user defaults. Missing fields fall back to the built in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub number_of_words: usize,
    pub number_of_secs: u32,
    pub words_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_NUMBER_OF_WORDS,
            number_of_secs: DEFAULT_DURATION_SECS,
            words_file: None,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            number_of_words: self.number_of_words,
            duration_secs: self.number_of_secs,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(
                    "ignoring unreadable config {}: {e}",
                    self.path.display()
                ),
            },
            Err(e) => tracing::debug!("no config at {}: {e}", self.path.display()),
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
