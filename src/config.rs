//! Engine configuration
//!
//! All structs deserialize from partial YAML documents; missing fields take
//! their `Default` values. Call `validate()` (or construct through the engine
//! builders, which do) before running anything.

use crate::error::{SwarmError, SwarmResult};
use serde::{Deserialize, Serialize};

/// Population and run-length settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SwarmConfig {
    pub population_size: usize,
    pub max_iterations: usize,
    /// Seed for the shared random source. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Run the per-particle update phase on the rayon pool.
    pub parallel: bool,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_iterations: 100,
            seed: None,
            parallel: false,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> SwarmResult<()> {
        if self.population_size == 0 {
            return Err(SwarmError::config("population_size must be positive"));
        }
        Ok(())
    }
}

/// Settings of the adaptive heterogeneous iteration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Length of every behavior's success window
    pub window_size: usize,
    /// Share of the pool sampled per tournament, in (0, 1]
    pub tournament_fraction: f64,
    /// Iterations without personal-best improvement before a particle switches behavior
    pub stagnation_threshold: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            tournament_fraction: 0.4,
            stagnation_threshold: 10,
        }
    }
}

impl AdaptiveConfig {
    pub fn validate(&self) -> SwarmResult<()> {
        if self.window_size == 0 {
            return Err(SwarmError::config("window_size must be positive"));
        }
        validate_fraction("tournament_fraction", self.tournament_fraction)
    }
}

/// Settings of sentry-based environment change detection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SentryConfig {
    /// Number of particles re-evaluated per check
    pub sentries: usize,
    /// Absolute fitness difference that counts as a change
    pub epsilon: f64,
    /// Check every `interval` iterations
    pub interval: usize,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            sentries: 5,
            epsilon: 1e-3,
            interval: 1,
        }
    }
}

impl SentryConfig {
    pub fn validate(&self) -> SwarmResult<()> {
        if self.sentries == 0 {
            return Err(SwarmError::config("sentries must be positive"));
        }
        if self.interval == 0 {
            return Err(SwarmError::config("sentry interval must be positive"));
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(SwarmError::config(format!(
                "sentry epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Top-level configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub swarm: SwarmConfig,
    pub adaptive: AdaptiveConfig,
    pub sentry: Option<SentryConfig>,
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> SwarmResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SwarmResult<()> {
        self.swarm.validate()?;
        self.adaptive.validate()?;
        if let Some(sentry) = &self.sentry {
            sentry.validate()?;
        }
        Ok(())
    }
}

pub(crate) fn validate_fraction(name: &str, value: f64) -> SwarmResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SwarmError::config(format!(
            "{} must lie in (0, 1], got {}",
            name, value
        )))
    }
}
