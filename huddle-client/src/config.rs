use crate::error::ClientError;
use huddle_core::IceServerConfig;
use std::time::Duration;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Client-side configuration. Traversal servers are mandatory: every
/// peer transport in the mesh is created with this list.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Fixed delay before the single reconnect attempt after transport
    /// loss. Deliberately not a backoff schedule.
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Result<Self, ClientError> {
        if ice_servers.iter().all(|s| s.urls.is_empty()) {
            return Err(ClientError::NoIceServers);
        }

        Ok(Self {
            ice_servers,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}
