pub mod capture;
pub mod search;
pub mod translate;
pub mod validate;

use anyhow::{Context, Result};
use reanchor_config::Config;
use reanchor_engine::{AnchorObject, Document, FileIdentity};
use relative_path::RelativePathBuf;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Configuration shared by every subcommand.
pub struct Settings {
    pub config: Config,
}

impl Settings {
    /// Loads `path` if given, otherwise the default config location. A missing
    /// file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Config::config_path);
        let config = match Config::load_from_path(&config_path)? {
            Some(config) => {
                log::debug!("Loaded config from {}", config_path.display());
                config
            }
            None => {
                log::debug!("No config at {}, using defaults", config_path.display());
                Config::default()
            }
        };
        Ok(Self { config })
    }

    fn workspace_root(&self) -> Result<PathBuf> {
        match &self.config.workspace_root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().context("Failed to read the current directory"),
        }
    }

    /// Identity of `path` relative to the workspace root, or just its file
    /// name when it lives outside the root.
    pub fn file_identity(&self, path: &Path) -> Result<FileIdentity> {
        let root = std::path::absolute(self.workspace_root()?)?;
        let absolute = std::path::absolute(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;

        let relative = match absolute.strip_prefix(&root) {
            Ok(relative) => RelativePathBuf::from_path(relative)
                .with_context(|| format!("Failed to make {} relative", path.display()))?,
            Err(_) => {
                let name = path.file_name().unwrap_or(path.as_os_str());
                RelativePathBuf::from(name.to_string_lossy().as_ref())
            }
        };
        Ok(FileIdentity::from_path(relative))
    }
}

pub fn read_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    Ok(Document::new(&text))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

pub fn read_anchor(path: &Path) -> Result<AnchorObject> {
    read_json(path).context("Expected an anchor object")
}
