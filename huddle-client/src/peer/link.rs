use crate::media::StreamHandle;
use crate::peer::transport::PeerTransport;
use huddle_core::ConnectionId;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Negotiation progress for one remote peer.
///
/// Initiator path: `New → OfferCreated → AwaitingAnswer → Connected`.
/// Responder path: `New → OfferReceived → AnswerCreated → Connected`.
/// `Closed` is reachable from anywhere and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    OfferCreated,
    AwaitingAnswer,
    OfferReceived,
    AnswerCreated,
    Connected,
    Closed,
}

/// One mesh edge: the owned transport plus the bookkeeping that sequences
/// the asynchronous description/candidate exchange.
pub struct PeerLink {
    pub remote: ConnectionId,
    pub state: LinkState,
    pub transport: Arc<dyn PeerTransport>,
    /// Monotonic tag carried by spawned negotiation steps. A completion
    /// whose generation no longer matches raced a teardown and is dropped.
    pub generation: u64,
    pub remote_stream: Option<StreamHandle>,
    pending_candidates: VecDeque<serde_json::Value>,
    remote_described: bool,
}

impl PeerLink {
    pub fn new(remote: ConnectionId, transport: Arc<dyn PeerTransport>, generation: u64) -> Self {
        Self {
            remote,
            state: LinkState::New,
            transport,
            generation,
            remote_stream: None,
            pending_candidates: VecDeque::new(),
            remote_described: false,
        }
    }

    /// Closed is terminal: once there, no transition applies (re-closing
    /// included).
    pub fn set_state(&mut self, next: LinkState) {
        if self.state == LinkState::Closed {
            return;
        }
        debug!("Link {}: {:?} -> {:?}", self.remote, self.state, next);
        self.state = next;
    }

    pub fn is_closed(&self) -> bool {
        self.state == LinkState::Closed
    }

    /// True once the remote description is in and candidates can be fed
    /// straight to the transport.
    pub fn remote_described(&self) -> bool {
        self.remote_described
    }

    /// Queue a candidate that arrived ahead of the remote description.
    pub fn buffer_candidate(&mut self, candidate: serde_json::Value) {
        debug!(
            "Link {}: buffering candidate ({} pending)",
            self.remote,
            self.pending_candidates.len() + 1
        );
        self.pending_candidates.push_back(candidate);
    }

    /// Marks the remote description applied and hands back everything
    /// buffered so far, in arrival order. The queue is drained, so each
    /// candidate is replayed exactly once.
    pub fn mark_remote_described(&mut self) -> VecDeque<serde_json::Value> {
        self.remote_described = true;
        std::mem::take(&mut self.pending_candidates)
    }
}
