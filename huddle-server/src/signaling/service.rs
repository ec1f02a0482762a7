use crate::signaling::sink::SignalSink;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ConnectionId, SignalEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Fan-out table from connection id to its WebSocket send task. Each
/// connection writes through a single unbounded channel, which is what
/// preserves per-recipient ordering.
#[derive(Clone, Default)]
pub struct SignalingService {
    peers: Arc<DashMap<ConnectionId, mpsc::UnboundedSender<Message>>>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&self, id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(id, tx);
    }

    pub fn remove_peer(&self, id: &ConnectionId) {
        self.peers.remove(id);
    }

    pub fn send_signal(&self, id: ConnectionId, event: SignalEvent) {
        if let Some(peer) = self.peers.get(&id) {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {}: {:?}", id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal event: {}", e),
            }
        } else {
            warn!("Attempted to send signal to disconnected user {}", id);
        }
    }
}

#[async_trait]
impl SignalSink for SignalingService {
    async fn unicast(&self, target: ConnectionId, event: SignalEvent) {
        self.send_signal(target, event);
    }
}
