//! Configuration for a simulation session

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ResourceKind;
use crate::grid::PlacementPolicy;
use crate::ledger::ResourceAmounts;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Session profile. Catalog economics are fixed; only the opening pool and
/// the staffing of new buildings vary between profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub name: String,
    /// Kinds left out of the map start at zero.
    #[serde(default = "default_starting_resources")]
    pub starting_resources: ResourceAmounts,
    #[serde(default)]
    pub placement: PlacementPolicy,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub fn default_starting_resources() -> ResourceAmounts {
    ResourceAmounts::from([
        (ResourceKind::Wood, 140),
        (ResourceKind::Stone, 60),
        (ResourceKind::Wheat, 220),
        (ResourceKind::Gold, 160),
    ])
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            starting_resources: default_starting_resources(),
            placement: PlacementPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl SimulationConfig {
    /// Load and validate a YAML profile
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "configuration must define a name".to_string(),
            ));
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }
}
