use huddle_core::{ConnectionId, RoomId};
use std::collections::HashMap;

/// Per-connection session state.
#[derive(Debug, Default, Clone)]
pub struct Session {
    /// Room this connection has joined, if any. Set once per join.
    pub room_id: Option<RoomId>,
    /// Session-scoped host flag. Self-declared at join or granted later.
    pub is_host: bool,
}

/// Tracks every active connection. Owned exclusively by the relay task,
/// so mutations need no locking.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, id: ConnectionId) {
        self.sessions.insert(id, Session::default());
    }

    /// Removes the session and returns its final state, so the caller can
    /// run room-leave side effects.
    pub fn disconnect(&mut self, id: &ConnectionId) -> Option<Session> {
        self.sessions.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn assign_room(&mut self, id: &ConnectionId, room_id: RoomId, is_host: bool) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.room_id = Some(room_id);
            session.is_host = is_host;
        }
    }

    pub fn set_host(&mut self, id: &ConnectionId, is_host: bool) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.is_host = is_host;
        }
    }
}
