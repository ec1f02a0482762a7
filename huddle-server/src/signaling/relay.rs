use crate::room::{RoomDirectory, SessionRegistry};
use crate::signaling::relay_command::RelayCommand;
use crate::signaling::sink::SignalSink;
use huddle_core::{ConnectionId, RoomId, SignalEvent, SignalRequest};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Single-writer router over the session registry and room directory.
/// Negotiation payloads pass through untouched; only the addressing is
/// rewritten (`to` becomes `from: sender`).
pub struct SignalingRelay {
    pub(crate) registry: SessionRegistry,
    pub(crate) directory: RoomDirectory,
    pub(crate) sink: Arc<dyn SignalSink>,
    command_rx: mpsc::Receiver<RelayCommand>,
}

impl SignalingRelay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, sink: Arc<dyn SignalSink>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            directory: RoomDirectory::new(),
            sink,
            command_rx,
        }
    }

    pub async fn run(mut self) {
        info!("Signaling relay started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Signaling relay finished");
    }

    async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connected { id } => {
                info!("Connection established: {}", id);
                self.registry.connect(id);
                self.sink.unicast(id, SignalEvent::Welcome { id }).await;
            }

            RelayCommand::Incoming { from, request } => {
                self.handle_request(from, request).await;
            }

            RelayCommand::Disconnected { id } => {
                self.handle_disconnect(id).await;
            }
        }
    }

    async fn handle_request(&mut self, from: ConnectionId, request: SignalRequest) {
        match request {
            SignalRequest::JoinRoom { room_id, is_host } => {
                self.handle_join(from, room_id, is_host).await;
            }

            SignalRequest::Offer { to, offer } => {
                self.sink
                    .unicast(to, SignalEvent::Offer { from, offer })
                    .await;
            }

            SignalRequest::Answer { to, answer } => {
                self.sink
                    .unicast(to, SignalEvent::Answer { from, answer })
                    .await;
            }

            SignalRequest::IceCandidate { to, candidate } => {
                self.sink
                    .unicast(to, SignalEvent::IceCandidate { from, candidate })
                    .await;
            }

            privileged => self.handle_host_request(from, privileged).await,
        }
    }

    async fn handle_join(&mut self, id: ConnectionId, room_id: RoomId, wants_host: bool) {
        if let Some(session) = self.registry.get(&id) {
            if session.room_id.is_some() {
                warn!("Connection {} already joined a room, ignoring join", id);
                return;
            }
        } else {
            warn!("Join from unknown connection {}", id);
            return;
        }

        info!(
            "Connection {} joins room '{}' (host: {})",
            id, room_id, wants_host
        );

        let count = self.directory.join(&room_id, id, wants_host);
        self.registry.assign_room(&id, room_id.clone(), wants_host);

        self.broadcast_except(
            &room_id,
            &id,
            SignalEvent::UserJoined {
                id,
                is_host: wants_host,
            },
        )
        .await;
        self.broadcast(&room_id, SignalEvent::UserCount { count })
            .await;
    }

    async fn handle_disconnect(&mut self, id: ConnectionId) {
        let Some(session) = self.registry.disconnect(&id) else {
            return;
        };

        info!("Connection closed: {}", id);

        let Some(room_id) = session.room_id else {
            return;
        };

        let count = self.directory.leave(&room_id, &id);

        self.broadcast(&room_id, SignalEvent::UserDisconnected { id })
            .await;
        self.broadcast(&room_id, SignalEvent::UserCount { count })
            .await;
    }

    pub(crate) async fn broadcast(&self, room_id: &RoomId, event: SignalEvent) {
        for member in self.directory.members(room_id) {
            self.sink.unicast(member, event.clone()).await;
        }
    }

    pub(crate) async fn broadcast_except(
        &self,
        room_id: &RoomId,
        excluded: &ConnectionId,
        event: SignalEvent,
    ) {
        for member in self.directory.members_except(room_id, excluded) {
            self.sink.unicast(member, event.clone()).await;
        }
    }
}
