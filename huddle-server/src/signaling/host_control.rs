use crate::signaling::relay::SignalingRelay;
use huddle_core::{ConnectionId, RoomId, SignalEvent, SignalRequest};
use tracing::{debug, info};

/// Authorization layer over the room directory. Every privileged request
/// passes the same gate: the sender must currently be in the stated
/// room's host set. Unauthorized requests are dropped without a reply.
impl SignalingRelay {
    pub(crate) async fn handle_host_request(&mut self, from: ConnectionId, request: SignalRequest) {
        let Some(room_id) = privileged_room(&request) else {
            return;
        };

        if !self.directory.is_host(room_id, &from) {
            debug!(
                "Dropping privileged request from non-host {} for room '{}'",
                from, room_id
            );
            return;
        }

        match request {
            SignalRequest::KickUser { room_id, user_id } => {
                info!("Host {} kicks {} from room '{}'", from, user_id, room_id);

                self.sink.unicast(user_id, SignalEvent::Kicked).await;
                self.broadcast(&room_id, SignalEvent::UserKicked { id: user_id })
                    .await;
            }

            SignalRequest::MuteUser { room_id, user_id } => {
                info!("Host {} mutes {} in room '{}'", from, user_id, room_id);

                // Trust-based: the server never touches media, it can only
                // ask the target to disable its own capture.
                self.sink.unicast(user_id, SignalEvent::RemoteMute).await;
            }

            SignalRequest::AddHost { room_id, user_id } => {
                info!("Host {} promotes {} in room '{}'", from, user_id, room_id);

                // No membership check: an id may be pre-authorized before
                // it ever joins.
                self.directory.add_host(&room_id, user_id);
                self.registry.set_host(&user_id, true);

                self.sink
                    .unicast(user_id, SignalEvent::HostStatus { is_host: true })
                    .await;
                self.broadcast(&room_id, SignalEvent::HostAdded { id: user_id })
                    .await;
            }

            SignalRequest::RemoveHost { room_id, user_id } => {
                info!("Host {} demotes {} in room '{}'", from, user_id, room_id);

                self.directory.remove_host(&room_id, &user_id);
                self.registry.set_host(&user_id, false);

                self.sink
                    .unicast(user_id, SignalEvent::HostStatus { is_host: false })
                    .await;
                self.broadcast(&room_id, SignalEvent::HostRemoved { id: user_id })
                    .await;
            }

            _ => {}
        }
    }
}

fn privileged_room(request: &SignalRequest) -> Option<&RoomId> {
    match request {
        SignalRequest::KickUser { room_id, .. }
        | SignalRequest::MuteUser { room_id, .. }
        | SignalRequest::AddHost { room_id, .. }
        | SignalRequest::RemoveHost { room_id, .. } => Some(room_id),
        _ => None,
    }
}
