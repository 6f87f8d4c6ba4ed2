use super::{ConfigError, Variables, VariablesValidator, DEFAULT_VARIABLES_PATH};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Reads `variables.json` on demand
///
/// Cloning is cheap; every component that needs configuration holds its own
/// loader and calls [`VariablesLoader::load`] at the point of use.
#[derive(Debug, Clone)]
pub struct VariablesLoader {
    path: PathBuf,
}

impl VariablesLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the configuration file
    pub async fn load(&self) -> Result<Variables, ConfigError> {
        debug!("Reading configuration from {}", self.path.display());

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: self.path.clone(),
                    source: e,
                }
            } else {
                ConfigError::Read {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Read, parse and validate the configuration file
    pub async fn load_validated(&self) -> Result<Variables, ConfigError> {
        let variables = self.load().await?;
        VariablesValidator::validate(&variables)?;
        Ok(variables)
    }
}

impl Default for VariablesLoader {
    fn default() -> Self {
        Self::new(DEFAULT_VARIABLES_PATH)
    }
}
