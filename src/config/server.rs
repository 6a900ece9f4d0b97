//! Status server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use super::parse::{env_duration, env_or};
use super::ConfigError;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_SHUTDOWN_TIMEOUT: &str = "3s";

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address for `/live`, `/ready` and `/metrics` (default: 0.0.0.0:8000).
    pub listen_addr: SocketAddr,
    /// How long in-flight requests may finish after shutdown starts.
    /// Zero when set to "off".
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_addr = env_or("HEALTH_LISTEN_ADDR", DEFAULT_LISTEN_ADDR);
        let listen_addr: SocketAddr = raw_addr.parse().map_err(|e| ConfigError::Parse {
            key: "HEALTH_LISTEN_ADDR".into(),
            value: raw_addr.clone(),
            error: format!("{}", e),
        })?;

        let shutdown_timeout = env_duration("HEALTH_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT)?
            .unwrap_or(Duration::ZERO);

        Ok(Self {
            listen_addr,
            shutdown_timeout,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            shutdown_timeout: Duration::from_secs(3),
        }
    }
}
