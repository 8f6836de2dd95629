use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

use crate::SanityError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the paper server hosting the tag endpoints.
    pub endpoint: String,
    /// User the rendered page is shown to. `None` hides the tag controls.
    pub user: Option<String>,
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, SanityError> {
        loader.load().await
    }
    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<(), SanityError> {
        saver.save(self).await
    }
}

impl Default for Config {
    /// Creates a new default configuration.
    ///
    /// The default configuration points at a local server on port 5000.
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_owned(),
            user: None,
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> impl Future<Output = Result<Config, SanityError>> + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &Config) -> impl Future<Output = Result<(), SanityError>> + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// [`Config`] data will be serialized and deserialized using the file extension.
    /// This supports `.json` and `.toml` files.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<config dir>/sanity/config.toml`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sanity").join("config.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<Config, SanityError> {
        match self.extension() {
            "json" => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            "toml" => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            other => Err(SanityError::ConfigFormat(other.to_owned())),
        }
    }
}

impl Saver for FileStore {
    async fn save(&self, config: &Config) -> Result<(), SanityError> {
        let contents = match self.extension() {
            "json" => serde_json::to_string_pretty(config)?,
            "toml" => toml::to_string_pretty(config)?,
            other => return Err(SanityError::ConfigFormat(other.to_owned())),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(&self.path, contents)?)
    }
}
