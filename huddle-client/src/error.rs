use crate::media::MediaError;
use crate::peer::TransportError;
use crate::signal_channel::SignalingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally, before anything goes over the wire.
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("already joined a room")]
    AlreadyJoined,

    #[error("not in a room")]
    NotJoined,

    #[error("at least one ICE server is required")]
    NoIceServers,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Signaling(#[from] SignalingError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session worker is gone; the handle is unusable.
    #[error("session terminated")]
    SessionClosed,
}
