use crate::media::StreamHandle;
use huddle_core::ConnectionId;

/// Events surfaced to the embedding UI/media layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    RemoteStreamAdded {
        id: ConnectionId,
        stream: StreamHandle,
    },
    RemoteStreamRemoved {
        id: ConnectionId,
    },
    ParticipantCountChanged {
        count: usize,
    },
    LocalHostStatusChanged {
        is_host: bool,
    },
    RemoteHostChanged {
        id: ConnectionId,
        is_host: bool,
    },
    /// Negotiation with this peer settled in a failed state; the
    /// participant is present but unreachable.
    PeerUnreachable {
        id: ConnectionId,
    },
    Kicked,
    ConnectionLost,
    ConnectionRestored,
}
