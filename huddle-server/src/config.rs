use std::env;
use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid HUDDLE_BIND_ADDR '{0}': {1}")]
    InvalidBindAddr(String, std::net::AddrParseError),
}

/// Server configuration, read from the environment. The server never
/// needs ICE configuration itself: traversal servers are a client
/// concern, the relay only moves opaque payloads.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = env::var("HUDDLE_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw
            .parse()
            .map_err(|e| ConfigError::InvalidBindAddr(raw, e))?;

        Ok(Self { bind_addr })
    }
}
