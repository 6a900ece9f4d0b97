//! Configuration module for tokio_healthcheck.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_healthcheck::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("History size: {}", config.health.history_size);
//! ```

mod error;
mod health;
mod logging;
mod parse;
mod server;

pub use error::ConfigError;
pub use health::HealthConfig;
pub use logging::LoggingConfig;
pub use parse::parse_duration;
pub use server::ServerConfig;

/// Complete application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Status server configuration.
    pub server: ServerConfig,
    /// Health check configuration.
    pub health: HealthConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            health: HealthConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  History size: {}", self.health.history_size);

        if self.server.shutdown_timeout.is_zero() {
            info!("  Shutdown timeout: disabled");
        } else {
            info!(
                "  Shutdown timeout: {}ms",
                self.server.shutdown_timeout.as_millis()
            );
        }

        info!("  Service name: {}", self.logging.service_name);
    }
}
