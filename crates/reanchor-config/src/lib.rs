use reanchor_engine::{IndentConfig, ReanchorConfig, ScoringConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_DIR: &str = "~/.config/reanchor";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read reanchor config {}: {source}", path.display())]
    ConfigReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid reanchor config {}: {source}", path.display())]
    ConfigParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Cannot write reanchor config {}: {source}", path.display())]
    ConfigWriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot serialize reanchor config: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
}

/// User settings. Every section is optional in the file; missing values fall
/// back to the engine defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory file identities are made relative to. Defaults to the
    /// current directory.
    pub workspace_root: Option<PathBuf>,
    /// Lines of context captured above and below a new anchor.
    pub surrounding_lines: usize,
    pub indent: IndentConfig,
    pub scoring: ScoringConfig,
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_root: None,
            surrounding_lines: 5,
            indent: IndentConfig::default(),
            scoring: ScoringConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`. A file that does not exist is `Ok(None)`, not an error.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ConfigReadError {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut config = Self::parse(&text).map_err(|source| ConfigError::ConfigParseError {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(root) = config.workspace_root.take() {
            config.workspace_root = Some(Self::expand_path(&root).unwrap_or(root));
        }
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Writes the config, creating parent directories as needed.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |source| ConfigError::ConfigWriteError {
            path: path.to_path_buf(),
            source,
        };

        let text = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(write_error)?;
        }
        std::fs::write(path, text).map_err(write_error)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(Self::config_path())
    }

    /// `~/.config/reanchor/config.toml` with the home directory filled in.
    pub fn config_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde(CONFIG_DIR).as_ref()).join(CONFIG_FILE)
    }

    /// Search settings in the shape the engine takes them.
    pub fn reanchor(&self) -> ReanchorConfig {
        ReanchorConfig {
            scoring: self.scoring.clone(),
            search: self.search.clone(),
        }
    }

    /// Expands `~` and `$VARS`. Unset variables leave the path unexpanded.
    fn expand_path(path: &Path) -> Option<PathBuf> {
        shellexpand::full(&path.to_string_lossy())
            .ok()
            .map(|expanded| PathBuf::from(expanded.into_owned()))
    }
}
