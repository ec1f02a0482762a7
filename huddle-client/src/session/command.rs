use crate::error::ClientError;
use huddle_core::{ConnectionId, RoomId};
use tokio::sync::oneshot;

pub(crate) type Reply = oneshot::Sender<Result<(), ClientError>>;

/// Commands from the `CallSession` handle into the session worker.
pub(crate) enum SessionCommand {
    Join {
        room_id: RoomId,
        as_host: bool,
        reply: Reply,
    },
    Leave {
        reply: Reply,
    },
    ToggleAudio {
        reply: oneshot::Sender<bool>,
    },
    ToggleVideo {
        reply: oneshot::Sender<bool>,
    },
    Kick {
        user: ConnectionId,
        reply: Reply,
    },
    Mute {
        user: ConnectionId,
        reply: Reply,
    },
    Promote {
        user: ConnectionId,
        reply: Reply,
    },
    Demote {
        user: ConnectionId,
        reply: Reply,
    },
}
