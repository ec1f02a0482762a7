use huddle_core::{ConnectionId, RoomId};
use std::collections::{HashMap, HashSet};

/// Per-room membership and host sets. Rooms are created lazily on first
/// join and member entries are never pruned; host sets are dropped the
/// moment they empty, which is what makes a host-less room permanently
/// unprivileged.
///
/// The host set is intentionally not constrained to be a subset of the
/// member set: a kicked host keeps the flag until their connection drops,
/// and a host can be added before the target ever joins.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    members: HashMap<RoomId, HashSet<ConnectionId>>,
    hosts: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the connection to the room, creating it if absent. Returns the
    /// member count after the join.
    pub fn join(&mut self, room_id: &RoomId, id: ConnectionId, wants_host: bool) -> usize {
        let members = self.members.entry(room_id.clone()).or_default();
        members.insert(id);

        if wants_host {
            self.hosts.entry(room_id.clone()).or_default().insert(id);
        }

        members.len()
    }

    /// Removes the connection from the room's member and host sets.
    /// Returns the member count after removal.
    pub fn leave(&mut self, room_id: &RoomId, id: &ConnectionId) -> usize {
        if let Some(members) = self.members.get_mut(room_id) {
            members.remove(id);
        }

        if let Some(hosts) = self.hosts.get_mut(room_id) {
            hosts.remove(id);
            if hosts.is_empty() {
                self.hosts.remove(room_id);
            }
        }

        self.member_count(room_id)
    }

    pub fn is_host(&self, room_id: &RoomId, id: &ConnectionId) -> bool {
        self.hosts
            .get(room_id)
            .map(|hosts| hosts.contains(id))
            .unwrap_or(false)
    }

    pub fn add_host(&mut self, room_id: &RoomId, id: ConnectionId) {
        self.hosts.entry(room_id.clone()).or_default().insert(id);
    }

    pub fn remove_host(&mut self, room_id: &RoomId, id: &ConnectionId) {
        if let Some(hosts) = self.hosts.get_mut(room_id) {
            hosts.remove(id);
            if hosts.is_empty() {
                self.hosts.remove(room_id);
            }
        }
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.members.get(room_id).map(HashSet::len).unwrap_or(0)
    }

    pub fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.members
            .get(room_id)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn members_except(&self, room_id: &RoomId, excluded: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .get(room_id)
            .map(|m| m.iter().copied().filter(|id| id != excluded).collect())
            .unwrap_or_default()
    }

    pub fn has_hosts(&self, room_id: &RoomId) -> bool {
        self.hosts.contains_key(room_id)
    }
}
