//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the society and
//! allocation configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::Company;

use super::types::{AllocationRules, EngineConfig, SocietyConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── society.yaml     # Society name, company party, currency, fee, journal
/// └── allocation.yaml  # Role split percentages and originals policy
/// ```
///
/// # Example
///
/// ```no_run
/// use royalty_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Distributing for {}", loader.society().name);
/// # Ok::<(), royalty_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if a required file is missing, contains invalid YAML,
    /// or holds values outside their allowed range.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let society = Self::load_yaml::<SocietyConfig>(&path.join("society.yaml"))?;

        // allocation.yaml is optional; the standard split applies without it
        let allocation_path = path.join("allocation.yaml");
        let rules = if allocation_path.exists() {
            Self::load_yaml::<AllocationRules>(&allocation_path)?
        } else {
            AllocationRules::default()
        };

        let config = EngineConfig::new(society, rules)?;
        tracing::debug!(
            path = %path.display(),
            society = %config.society().name,
            currency = %config.society().currency.code,
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the society settings.
    pub fn society(&self) -> &SocietyConfig {
        self.config.society()
    }

    /// Returns the allocation rules.
    pub fn rules(&self) -> &AllocationRules {
        self.config.rules()
    }

    /// Returns the company context.
    pub fn company(&self) -> Company {
        self.config.company()
    }
}
