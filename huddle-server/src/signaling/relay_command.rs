use huddle_core::{ConnectionId, SignalRequest};

/// Commands fed into the relay task by the WebSocket front end. Each is
/// handled to completion before the next, so room and host mutations are
/// atomic relative to one another.
#[derive(Debug)]
pub enum RelayCommand {
    /// A signaling transport was established and assigned an id.
    Connected { id: ConnectionId },

    /// A parsed request arrived from a connected client.
    Incoming {
        from: ConnectionId,
        request: SignalRequest,
    },

    /// The signaling transport dropped (close frame or socket loss).
    Disconnected { id: ConnectionId },
}
