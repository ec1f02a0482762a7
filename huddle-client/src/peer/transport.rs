use crate::media::{LocalTrack, StreamHandle};
use async_trait::async_trait;
use huddle_core::{ConnectionId, IceServerConfig};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("peer transport setup failed: {0}")]
    Setup(String),

    #[error("session description exchange failed: {0}")]
    Description(String),

    #[error("candidate rejected: {0}")]
    Candidate(String),
}

/// Events a peer transport pushes back to the session loop, tagged with
/// the remote id the transport belongs to.
#[derive(Debug, Clone)]
pub struct PeerEvent {
    pub peer: ConnectionId,
    pub event: TransportEvent,
}

#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A local network candidate was discovered; forwarded to the remote
    /// side immediately, independent of offer/answer progress.
    CandidateDiscovered(serde_json::Value),

    /// A remote media stream became available for rendering.
    RemoteTrack(StreamHandle),

    /// No viable network path; the link will settle as unreachable.
    Failed,
}

/// Opaque connection to one remote peer. Descriptions and candidates are
/// raw JSON values; the orchestrator sequences them but never inspects
/// them. `create_offer`/`create_answer` also install the produced
/// description locally.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn add_track(&self, track: LocalTrack) -> Result<(), TransportError>;

    async fn create_offer(&self) -> Result<serde_json::Value, TransportError>;

    /// Requires a remote description to have been applied first.
    async fn create_answer(&self) -> Result<serde_json::Value, TransportError>;

    async fn set_remote_description(&self, desc: serde_json::Value) -> Result<(), TransportError>;

    async fn add_candidate(&self, candidate: serde_json::Value) -> Result<(), TransportError>;

    /// Idempotent; safe to call on an already closed transport.
    async fn close(&self);
}

#[async_trait]
pub trait PeerTransportFactory: Send + Sync {
    async fn create(
        &self,
        peer: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
