//! YAML-configurable engine settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{EosError, ErrorInfo};

/// Environment variable capping the size of the default worker pool.
pub const MAX_THREADS_ENV: &str = "EOS_MAX_THREADS";

/// Behaviour of parameter writes outside `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangePolicy {
    /// Reject the write with a range error.
    #[default]
    Strict,
    /// Clamp into the range and warn.
    Clamp,
    /// Store the value as given.
    Permissive,
}

/// Tolerances for adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Relative tolerance.
    #[serde(default = "IntegrationConfig::default_epsrel")]
    pub epsrel: f64,
    /// Absolute tolerance.
    #[serde(default = "IntegrationConfig::default_epsabs")]
    pub epsabs: f64,
    /// Maximum bisection depth.
    #[serde(default = "IntegrationConfig::default_max_depth")]
    pub max_depth: u32,
}

impl IntegrationConfig {
    const fn default_epsrel() -> f64 {
        1e-10
    }

    const fn default_epsabs() -> f64 {
        0.0
    }

    const fn default_max_depth() -> u32 {
        40
    }

    /// Rejects tolerances that can never be met.
    pub fn validate(&self) -> Result<(), EosError> {
        let tolerance = ToleranceRange::default();
        if !tolerance.contains(self.epsrel) || self.epsabs < 0.0 || self.max_depth == 0 {
            return Err(EosError::Internal(
                ErrorInfo::new("eos_core.integration_config", "invalid integration tolerances")
                    .with_context("epsrel", self.epsrel.to_string())
                    .with_context("epsabs", self.epsabs.to_string())
                    .with_context("max_depth", self.max_depth.to_string()),
            ));
        }
        Ok(())
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            epsrel: Self::default_epsrel(),
            epsabs: Self::default_epsabs(),
            max_depth: Self::default_max_depth(),
        }
    }
}

/// Inclusive range used for tolerance checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceRange {
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl ToleranceRange {
    /// Returns whether `value` lies within the inclusive range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ToleranceRange {
    fn default() -> Self {
        Self {
            min: f64::EPSILON,
            max: 1.0,
        }
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Policy applied to parameter worlds created from defaults.
    #[serde(default)]
    pub range_policy: RangePolicy,
    /// Worker pool size; `None` uses the available parallelism.
    #[serde(default)]
    pub max_threads: Option<usize>,
    /// Quadrature tolerances used by physics modules.
    #[serde(default)]
    pub integration: IntegrationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::default(),
            max_threads: None,
            integration: IntegrationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, EosError> {
        let config: EngineConfig =
            serde_yaml::from_str(text).map_err(|err| EosError::yaml("eos_core.config_parse", err))?;
        config.integration.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, EosError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| EosError::io("eos_core.config_io", path, err))?;
        Self::from_yaml_str(&text)
    }

    /// Pool size after applying `EOS_MAX_THREADS`; never zero.
    pub fn effective_threads(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let mut threads = self.max_threads.unwrap_or(available);
        if let Some(cap) = std::env::var(MAX_THREADS_ENV)
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
        {
            threads = threads.min(cap);
        }
        threads.max(1)
    }
}
