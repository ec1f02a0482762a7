use async_trait::async_trait;
use huddle_core::{ConnectionId, SignalEvent};

/// Outbound seam between the relay and whatever carries signals to
/// clients (the WebSocket service in production, a capture mock in
/// tests). Delivery to a vanished connection is a no-op.
#[async_trait]
pub trait SignalSink: Send + Sync {
    /// Deliver one event to one connection.
    async fn unicast(&self, target: ConnectionId, event: SignalEvent);
}
