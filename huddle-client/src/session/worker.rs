use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::ClientEvent;
use crate::media::{LocalTrack, MediaSubsystem};
use crate::peer::{NegotiationOutcome, PeerEvent, PeerOrchestrator, PeerTransportFactory};
use crate::session::command::SessionCommand;
use crate::signal_channel::{ChannelEvent, SignalChannel, SignalConnector};
use huddle_core::{ConnectionId, RoomId, SignalEvent, SignalRequest};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns all per-call state: the signaling link, the orchestrator and the
/// media toggles. Everything funnels through one select loop, so state
/// is only ever touched from here; the slow pieces (negotiation steps,
/// the reconnect timer) are spawned and re-enter via channels.
pub(crate) struct SessionWorker {
    config: ClientConfig,
    media: Arc<dyn MediaSubsystem>,
    connector: Arc<dyn SignalConnector>,
    channel: Option<Arc<dyn SignalChannel>>,
    channel_rx: Option<mpsc::Receiver<ChannelEvent>>,
    orchestrator: PeerOrchestrator,
    outbox_rx: mpsc::UnboundedReceiver<SignalRequest>,
    transport_events_rx: mpsc::Receiver<PeerEvent>,
    negotiation_rx: mpsc::Receiver<NegotiationOutcome>,
    command_rx: mpsc::Receiver<SessionCommand>,
    reconnect_tx: mpsc::Sender<u64>,
    reconnect_rx: mpsc::Receiver<u64>,
    /// Tag carried by the pending reconnect tick. Bumped on every loss
    /// and on leave, so a stale tick is recognized and dropped.
    reconnect_generation: u64,
    events: mpsc::UnboundedSender<ClientEvent>,
    local_id: Option<ConnectionId>,
    /// Current room and the host flag it was joined with.
    joined: Option<(RoomId, bool)>,
    /// Room to re-enter after a successful reconnect.
    rejoin: Option<(RoomId, bool)>,
    local_tracks: Vec<LocalTrack>,
    hosts: HashSet<ConnectionId>,
    local_host: bool,
    audio_enabled: bool,
    video_enabled: bool,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        config: ClientConfig,
        media: Arc<dyn MediaSubsystem>,
        factory: Arc<dyn PeerTransportFactory>,
        connector: Arc<dyn SignalConnector>,
        channel: Arc<dyn SignalChannel>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        command_rx: mpsc::Receiver<SessionCommand>,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        let (transport_tx, transport_events_rx) = mpsc::channel(256);
        let (negotiation_tx, negotiation_rx) = mpsc::channel(64);
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        // Internal timer channel: keeping it off the command channel
        // means dropping the last handle still ends the loop.
        let (reconnect_tx, reconnect_rx) = mpsc::channel(4);

        let orchestrator = PeerOrchestrator::new(
            factory,
            config.ice_servers.clone(),
            transport_tx,
            negotiation_tx,
            outbox_tx,
            events.clone(),
        );

        Self {
            config,
            media,
            connector,
            channel: Some(channel),
            channel_rx: Some(channel_rx),
            orchestrator,
            outbox_rx,
            transport_events_rx,
            negotiation_rx,
            command_rx,
            reconnect_tx,
            reconnect_rx,
            reconnect_generation: 0,
            events,
            local_id: None,
            joined: None,
            rejoin: None,
            local_tracks: Vec::new(),
            hosts: HashSet::new(),
            local_host: false,
            audio_enabled: true,
            video_enabled: true,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Session worker started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await,
                        None => break,
                    }
                }

                evt = recv_channel(&mut self.channel_rx) => {
                    match evt {
                        ChannelEvent::Signal(event) => self.handle_signal(event).await,
                        ChannelEvent::Closed => self.handle_connection_lost().await,
                    }
                }

                Some(request) = self.outbox_rx.recv() => {
                    self.forward_request(request).await;
                }

                Some(event) = self.transport_events_rx.recv() => {
                    self.orchestrator.handle_transport_event(event).await;
                }

                Some(outcome) = self.negotiation_rx.recv() => {
                    self.orchestrator.handle_negotiation(outcome).await;
                }

                Some(generation) = self.reconnect_rx.recv() => {
                    self.handle_reconnect_due(generation).await;
                }
            }
        }

        // Handle dropped: shut the call down.
        self.leave_internal().await;
        info!("Session worker finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Join {
                room_id,
                as_host,
                reply,
            } => {
                let result = self.handle_join(room_id, as_host).await;
                let _ = reply.send(result);
            }

            SessionCommand::Leave { reply } => {
                self.leave_internal().await;
                let _ = reply.send(Ok(()));
            }

            SessionCommand::ToggleAudio { reply } => {
                self.audio_enabled = !self.audio_enabled;
                self.media.set_audio_enabled(self.audio_enabled);
                let _ = reply.send(self.audio_enabled);
            }

            SessionCommand::ToggleVideo { reply } => {
                self.video_enabled = !self.video_enabled;
                self.media.set_video_enabled(self.video_enabled);
                let _ = reply.send(self.video_enabled);
            }

            SessionCommand::Kick { user, reply } => {
                let result = self
                    .host_request(user, |room_id, user_id| SignalRequest::KickUser {
                        room_id,
                        user_id,
                    })
                    .await;
                let _ = reply.send(result);
            }

            SessionCommand::Mute { user, reply } => {
                let result = self
                    .host_request(user, |room_id, user_id| SignalRequest::MuteUser {
                        room_id,
                        user_id,
                    })
                    .await;
                let _ = reply.send(result);
            }

            SessionCommand::Promote { user, reply } => {
                let result = self
                    .host_request(user, |room_id, user_id| SignalRequest::AddHost {
                        room_id,
                        user_id,
                    })
                    .await;
                let _ = reply.send(result);
            }

            SessionCommand::Demote { user, reply } => {
                let result = self
                    .host_request(user, |room_id, user_id| SignalRequest::RemoveHost {
                        room_id,
                        user_id,
                    })
                    .await;
                let _ = reply.send(result);
            }

        }
    }

    async fn handle_join(&mut self, room_id: RoomId, as_host: bool) -> Result<(), ClientError> {
        if room_id.is_empty() {
            return Err(ClientError::EmptyRoomId);
        }
        if self.joined.is_some() {
            return Err(ClientError::AlreadyJoined);
        }

        self.ensure_channel().await?;

        // Capture gates room entry: nothing has been sent yet, so a
        // failure here leaves no half-joined state behind.
        if self.local_tracks.is_empty() {
            let tracks = self.media.acquire_local().await?;
            self.local_tracks = tracks.clone();
            self.orchestrator.set_local_tracks(tracks);
            self.audio_enabled = true;
            self.video_enabled = true;
        }

        self.send_request(SignalRequest::JoinRoom {
            room_id: room_id.clone(),
            is_host: as_host,
        })
        .await?;

        info!("Joined room '{}' (host: {})", room_id, as_host);
        self.joined = Some((room_id, as_host));
        self.local_host = as_host;
        Ok(())
    }

    async fn handle_signal(&mut self, event: SignalEvent) {
        match event {
            SignalEvent::Welcome { id } => {
                debug!("Assigned connection id {}", id);
                self.local_id = Some(id);
            }

            SignalEvent::UserJoined { id, is_host } => {
                if is_host && self.hosts.insert(id) {
                    let _ = self
                        .events
                        .send(ClientEvent::RemoteHostChanged { id, is_host: true });
                }
                // The pre-existing side initiates toward the newcomer.
                self.orchestrator.initiate(id).await;
            }

            SignalEvent::UserCount { count } => {
                let _ = self
                    .events
                    .send(ClientEvent::ParticipantCountChanged { count });
            }

            SignalEvent::Offer { from, offer } => {
                self.orchestrator.handle_offer(from, offer).await;
            }

            SignalEvent::Answer { from, answer } => {
                self.orchestrator.handle_answer(from, answer).await;
            }

            SignalEvent::IceCandidate { from, candidate } => {
                self.orchestrator.handle_candidate(from, candidate).await;
            }

            SignalEvent::UserDisconnected { id } => {
                self.orchestrator.teardown(&id);
                if self.hosts.remove(&id) && self.local_id != Some(id) {
                    let _ = self
                        .events
                        .send(ClientEvent::RemoteHostChanged { id, is_host: false });
                }
            }

            SignalEvent::UserKicked { id } => {
                if self.local_id == Some(id) {
                    // Our own kick arrives via the Kicked unicast.
                    return;
                }
                // Host flag deliberately untouched: the server keeps the
                // kicked id in the host set until its socket drops.
                self.orchestrator.teardown(&id);
            }

            SignalEvent::Kicked => {
                info!("Kicked from the room");
                self.leave_internal().await;
                let _ = self.events.send(ClientEvent::Kicked);
            }

            SignalEvent::RemoteMute => {
                // Trust-based: a host asked us to stop sending audio.
                self.audio_enabled = false;
                self.media.set_audio_enabled(false);
            }

            SignalEvent::HostStatus { is_host } => {
                self.local_host = is_host;
                let _ = self
                    .events
                    .send(ClientEvent::LocalHostStatusChanged { is_host });
            }

            SignalEvent::HostAdded { id } => {
                if self.hosts.insert(id) && self.local_id != Some(id) {
                    let _ = self
                        .events
                        .send(ClientEvent::RemoteHostChanged { id, is_host: true });
                }
            }

            SignalEvent::HostRemoved { id } => {
                if self.hosts.remove(&id) && self.local_id != Some(id) {
                    let _ = self
                        .events
                        .send(ClientEvent::RemoteHostChanged { id, is_host: false });
                }
            }
        }
    }

    async fn handle_connection_lost(&mut self) {
        warn!("Signaling transport lost; peer mesh is stale");

        self.channel = None;
        self.channel_rx = None;
        self.local_id = None;
        self.rejoin = self.joined.take();
        self.hosts.clear();
        self.local_host = false;

        self.orchestrator.teardown_all();
        let _ = self.events.send(ClientEvent::ConnectionLost);

        // One attempt after a fixed delay, not a backoff schedule.
        self.reconnect_generation += 1;
        let generation = self.reconnect_generation;
        let delay = self.config.reconnect_delay;
        let tx = self.reconnect_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(generation).await;
        });
    }

    async fn handle_reconnect_due(&mut self, generation: u64) {
        // A tick outlived by a leave (or a newer loss) is stale.
        if generation != self.reconnect_generation || self.channel.is_some() {
            return;
        }

        info!("Attempting signaling reconnect");
        match self.connector.connect().await {
            Ok((channel, channel_rx)) => {
                self.channel = Some(channel);
                self.channel_rx = Some(channel_rx);

                // Fresh handshake; the mesh is rebuilt from scratch as
                // the join notifications fan out again. Restoration is
                // only reported once the rejoin is on the wire.
                if let Some((room_id, as_host)) = self.rejoin.take() {
                    let join = SignalRequest::JoinRoom {
                        room_id: room_id.clone(),
                        is_host: as_host,
                    };
                    if let Err(e) = self.send_request(join).await {
                        warn!("Rejoin after reconnect failed, staying offline: {}", e);
                        self.channel = None;
                        self.channel_rx = None;
                        return;
                    }
                    self.joined = Some((room_id, as_host));
                    self.local_host = as_host;
                }
                let _ = self.events.send(ClientEvent::ConnectionRestored);
            }
            Err(e) => warn!("Reconnect failed, staying offline: {}", e),
        }
    }

    async fn host_request(
        &mut self,
        user: ConnectionId,
        make: impl FnOnce(RoomId, ConnectionId) -> SignalRequest,
    ) -> Result<(), ClientError> {
        let Some((room_id, _)) = &self.joined else {
            return Err(ClientError::NotJoined);
        };

        let request = make(room_id.clone(), user);
        self.send_request(request).await
    }

    async fn send_request(&mut self, request: SignalRequest) -> Result<(), ClientError> {
        let Some(channel) = &self.channel else {
            return Err(crate::signal_channel::SignalingError::ChannelClosed.into());
        };
        channel.send(request).await?;
        Ok(())
    }

    /// Outbox traffic from the orchestrator. After a transport loss the
    /// leftovers of in-flight negotiations are dropped here.
    async fn forward_request(&mut self, request: SignalRequest) {
        let Some(channel) = &self.channel else {
            debug!("Dropping outbound request, signaling is down");
            return;
        };
        if let Err(e) = channel.send(request).await {
            warn!("Failed to send signaling request: {}", e);
        }
    }

    async fn ensure_channel(&mut self) -> Result<(), ClientError> {
        if self.channel.is_some() {
            return Ok(());
        }

        let (channel, channel_rx) = self.connector.connect().await?;
        self.channel = Some(channel);
        self.channel_rx = Some(channel_rx);
        Ok(())
    }

    /// Local teardown shared by leave(), being kicked and shutdown. The
    /// channel is closed deliberately, so no reconnect is scheduled and
    /// any tick already in flight is invalidated.
    async fn leave_internal(&mut self) {
        self.reconnect_generation += 1;
        self.orchestrator.teardown_all();
        self.joined = None;
        self.rejoin = None;
        self.hosts.clear();
        self.local_host = false;
        self.local_id = None;

        self.channel_rx = None;
        if let Some(channel) = self.channel.take() {
            channel.close().await;
        }
    }
}

async fn recv_channel(rx: &mut Option<mpsc::Receiver<ChannelEvent>>) -> ChannelEvent {
    match rx {
        Some(rx) => match rx.recv().await {
            Some(event) => event,
            None => ChannelEvent::Closed,
        },
        None => std::future::pending().await,
    }
}
