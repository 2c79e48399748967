//! Selection configuration.
//!
//! Settings for spread-out selection runs can come from defaults, a YAML
//! file, environment variables, or CLI flags. Later sources override earlier
//! ones; the CLI applies its flags on top of whatever this module loads.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diversity::{SpreadSampler, DEFAULT_SAMPLE_SIZE};
use crate::error::ConfigError;

/// Number of points selected when nothing else is configured.
pub const DEFAULT_TARGET_COUNT: usize = 2000;

/// Picks between progress log lines.
pub const DEFAULT_PROGRESS_EVERY: usize = 100;

/// Configuration for a spread-out selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of points to select.
    pub target_count: usize,
    /// Candidates scored per iteration.
    pub sample_size: usize,
    /// Fixed RNG seed for reproducible selections.
    pub seed: Option<u64>,
    /// Log a progress line every this many picks (0 = only at completion).
    pub progress_every: usize,
    /// Keep only candidates whose row mentions one of these regions.
    pub regions: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
            regions: Vec::new(),
        }
    }
}

impl SelectionConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Creates configuration from environment variables over the defaults.
    ///
    /// # Environment Variables
    ///
    /// - `GEOBIAS_TARGET_COUNT`: Points to select (default: 2000)
    /// - `GEOBIAS_SAMPLE_SIZE`: Candidates scored per iteration (default: 1000)
    /// - `GEOBIAS_SEED`: RNG seed (default: unseeded)
    /// - `GEOBIAS_PROGRESS_EVERY`: Picks between progress logs (default: 100)
    /// - `GEOBIAS_REGIONS`: Comma-separated region filter
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env()
    }

    /// Applies environment variable overrides to this configuration.
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("GEOBIAS_TARGET_COUNT") {
            self.target_count = parse_env_value(&val, "GEOBIAS_TARGET_COUNT")?;
        }

        if let Some(val) = lookup("GEOBIAS_SAMPLE_SIZE") {
            self.sample_size = parse_env_value(&val, "GEOBIAS_SAMPLE_SIZE")?;
        }

        if let Some(val) = lookup("GEOBIAS_SEED") {
            self.seed = Some(parse_env_value(&val, "GEOBIAS_SEED")?);
        }

        if let Some(val) = lookup("GEOBIAS_PROGRESS_EVERY") {
            self.progress_every = parse_env_value(&val, "GEOBIAS_PROGRESS_EVERY")?;
        }

        if let Some(val) = lookup("GEOBIAS_REGIONS") {
            self.regions = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_count == 0 {
            return Err(ConfigError::ValidationFailed(
                "target_count must be greater than 0".to_string(),
            ));
        }

        if self.sample_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "sample_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds a sampler from the sample size and seed.
    pub fn sampler(&self) -> SpreadSampler {
        let sampler = SpreadSampler::new().with_sample_size(self.sample_size);
        match self.seed {
            Some(seed) => sampler.with_seed(seed),
            None => sampler,
        }
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.regions = regions;
        self
    }
}

/// Parse an environment variable value.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
