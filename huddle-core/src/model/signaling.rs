use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Messages a client sends to the signaling server. Session descriptions
/// and candidates travel as raw JSON values: the relay routes them but
/// never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum SignalRequest {
    JoinRoom {
        room_id: RoomId,
        is_host: bool,
    },
    Offer {
        to: ConnectionId,
        offer: serde_json::Value,
    },
    Answer {
        to: ConnectionId,
        answer: serde_json::Value,
    },
    IceCandidate {
        to: ConnectionId,
        candidate: serde_json::Value,
    },
    KickUser {
        room_id: RoomId,
        user_id: ConnectionId,
    },
    MuteUser {
        room_id: RoomId,
        user_id: ConnectionId,
    },
    AddHost {
        room_id: RoomId,
        user_id: ConnectionId,
    },
    RemoveHost {
        room_id: RoomId,
        user_id: ConnectionId,
    },
}

/// Messages the server sends to clients. Unicast negotiation messages are
/// re-emitted with `to` rewritten to `from` so the receiver knows which
/// peer is talking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum SignalEvent {
    Welcome {
        id: ConnectionId,
    },
    UserJoined {
        id: ConnectionId,
        is_host: bool,
    },
    UserCount {
        count: usize,
    },
    Offer {
        from: ConnectionId,
        offer: serde_json::Value,
    },
    Answer {
        from: ConnectionId,
        answer: serde_json::Value,
    },
    IceCandidate {
        from: ConnectionId,
        candidate: serde_json::Value,
    },
    UserDisconnected {
        id: ConnectionId,
    },
    Kicked,
    UserKicked {
        id: ConnectionId,
    },
    RemoteMute,
    HostStatus {
        is_host: bool,
    },
    HostAdded {
        id: ConnectionId,
    },
    HostRemoved {
        id: ConnectionId,
    },
}
