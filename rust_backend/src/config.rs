//! Guide star search configuration file support.
//!
//! This module reads analyzer and catalog settings from TOML files. Every
//! setting has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::angle::{arcsec, Angle};
use crate::error::{AgsError, AgsResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgsConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

/// Settings of the asterism analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Minimum separation between any two stars of an asterism.
    #[serde(default = "default_min_separation_arcsec")]
    pub min_separation_arcsec: f64,
    /// Largest allowed magnitude difference within a tiptilt selection.
    #[serde(default)]
    pub max_magnitude_spread: Option<f64>,
    /// Evaluate position angles on the rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Catalog query settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Fold all criteria into one catalog query.
    #[serde(default = "default_merge_queries")]
    pub merge_queries: bool,
}

fn default_min_separation_arcsec() -> f64 {
    2.0
}

fn default_parallel() -> bool {
    true
}

fn default_merge_queries() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_separation_arcsec: default_min_separation_arcsec(),
            max_magnitude_spread: None,
            parallel: default_parallel(),
            max_results: None,
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            merge_queries: default_merge_queries(),
        }
    }
}

impl AnalyzerConfig {
    pub fn min_separation(&self) -> Angle {
        arcsec(self.min_separation_arcsec)
    }

    pub fn validate(&self) -> AgsResult<()> {
        if !self.min_separation_arcsec.is_finite() || self.min_separation_arcsec < 0.0 {
            return Err(AgsError::ConfigurationError(format!(
                "min_separation_arcsec must be a non-negative number, got {}",
                self.min_separation_arcsec
            )));
        }
        if let Some(spread) = self.max_magnitude_spread {
            if !spread.is_finite() || spread < 0.0 {
                return Err(AgsError::ConfigurationError(format!(
                    "max_magnitude_spread must be a non-negative number, got {}",
                    spread
                )));
            }
        }
        if self.max_results == Some(0) {
            return Err(AgsError::ConfigurationError(
                "max_results must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl AgsConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AgsConfig)` if the file was read, parsed and validated
    /// * `Err(AgsError::ConfigurationError)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> AgsResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AgsError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;
        let config: AgsConfig = content.parse()?;
        log::info!("Loaded guide star configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `ags.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> AgsResult<Self> {
        let search_paths = [
            PathBuf::from("ags.toml"),
            PathBuf::from("rust_backend/ags.toml"),
            PathBuf::from("../ags.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(AgsError::ConfigurationError(
            "No ags.toml found in standard locations".to_string(),
        ))
    }

    pub fn validate(&self) -> AgsResult<()> {
        self.analyzer.validate()
    }
}

impl FromStr for AgsConfig {
    type Err = AgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: AgsConfig = toml::from_str(s).map_err(|e| {
            AgsError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
