//! Health check configuration.

use super::parse::env_parse;
use super::ConfigError;
use crate::health::DEFAULT_HISTORY_CAPACITY;

/// Health check settings loaded from environment.
#[derive(Clone, Debug)]
pub struct HealthConfig {
    /// Outcomes kept per check, latest included (default: 5).
    pub history_size: usize,
}

impl HealthConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let history_size = env_parse("HEALTH_HISTORY_SIZE", DEFAULT_HISTORY_CAPACITY)?;
        Ok(Self {
            history_size: validate_history_size(history_size)?,
        })
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

fn validate_history_size(size: usize) -> Result<usize, ConfigError> {
    if size == 0 {
        return Err(ConfigError::Invalid {
            key: "HEALTH_HISTORY_SIZE".into(),
            message: "must be at least 1".into(),
        });
    }
    Ok(size)
}
