//! Server configuration.
//!
//! Configuration comes from environment variables with sensible defaults;
//! invalid values fail startup with an error naming the variable, the value
//! seen, and the reason.

use std::net::SocketAddr;

use snafu::Snafu;

/// Environment variable naming the HTTP listen address.
const HTTP_ADDR_ENV: &str = "LATCHKV_HTTP_ADDR";

/// Configuration errors.
#[derive(Debug, Snafu)]
pub enum ConfigError {
    /// An environment variable held a value that does not validate.
    #[snafu(display("invalid value for {key}: {value:?} ({reason})"))]
    InvalidValue {
        /// The environment variable.
        key: String,
        /// The value it held.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds. Loopback by default.
    pub http_addr: SocketAddr,
}

impl ServerConfig {
    /// Load configuration from the environment, applying defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let http_addr = match std::env::var(HTTP_ADDR_ENV) {
            Ok(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: HTTP_ADDR_ENV.to_string(),
                    value: raw.clone(),
                    reason: format!("must be a socket address like 127.0.0.1:8080: {e}"),
                })?,
            Err(_) => Self::default().http_addr,
        };

        Ok(Self { http_addr })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}
