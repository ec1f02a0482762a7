use async_trait::async_trait;
use huddle_core::{SignalEvent, SignalRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("signaling connect failed: {0}")]
    Connect(String),

    #[error("signaling channel closed")]
    ChannelClosed,
}

/// One inbound item from the signaling link. A `Closed` (or the receiver
/// draining empty) means transport loss: everything downstream of the
/// connection is stale from that moment.
#[derive(Debug)]
pub enum ChannelEvent {
    Signal(SignalEvent),
    Closed,
}

/// Outbound half of an established signaling connection.
#[async_trait]
pub trait SignalChannel: Send + Sync {
    async fn send(&self, request: SignalRequest) -> Result<(), SignalingError>;

    /// Deliberate local close; must not trigger the reconnect path.
    async fn close(&self);
}

/// Dials the signaling server. Called once at session start and once per
/// reconnect attempt; each successful dial is a brand-new session with a
/// fresh server-assigned id.
#[async_trait]
pub trait SignalConnector: Send + Sync {
    async fn connect(
        &self,
    ) -> Result<(Arc<dyn SignalChannel>, mpsc::Receiver<ChannelEvent>), SignalingError>;
}
