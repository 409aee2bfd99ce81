//! Error types for the swarm engine

use thiserror::Error;

/// Errors raised while configuring or running a swarm
#[derive(Error, Debug)]
pub enum SwarmError {
    /// Invalid configuration, detected before any iteration runs
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Vector lengths that must agree do not
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Operation intentionally not supported by this entity variant
    #[error("Operation '{operation}' is not supported by {entity}")]
    Unsupported {
        operation: &'static str,
        entity: &'static str,
    },

    /// YAML configuration could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

impl SwarmError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SwarmError::Configuration(msg.into())
    }
}

pub type SwarmResult<T> = Result<T, SwarmError>;
