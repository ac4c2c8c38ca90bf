//! Runtime configuration, loaded from TOML.
//!
//! Every section is optional; missing values fall back to the defaults the
//! application ships with.

use crate::{ConfigError, CoreError, Strategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub embedding: EmbeddingConfig,
    pub forest: ForestConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ceiling on simultaneous provider calls.
    pub max_in_flight: usize,
    /// Number of provider workers in the pool.
    pub worker_count: usize,
    pub seed: Option<u64>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 10,
            worker_count: 4,
            seed: None,
        }
    }
}

/// Hyperparameters for forest training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features drawn per split. `None` draws every feature, which leaves
    /// bagging as the only source of diversity between trees.
    pub num_features: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 20,
            min_samples_split: 2,
            num_features: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub strategy: Strategy,
}

impl RankerConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: RankerConfig = toml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded configuration from {}", path.display());
        debug!("Configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.max_in_flight == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "embedding.max_in_flight must be at least 1".to_string(),
            });
        }
        if self.embedding.worker_count == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "embedding.worker_count must be at least 1".to_string(),
            });
        }
        self.forest.validate()
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_trees == 0 {
            return Err(ConfigError::InvalidValue {
                field: "forest.num_trees".to_string(),
                value: self.num_trees.to_string(),
            });
        }
        if self.min_samples_split == 0 {
            return Err(ConfigError::InvalidValue {
                field: "forest.min_samples_split".to_string(),
                value: self.min_samples_split.to_string(),
            });
        }
        if self.num_features == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "forest.num_features".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}
