use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::ClientEvent;
use crate::media::MediaSubsystem;
use crate::peer::PeerTransportFactory;
use crate::session::command::SessionCommand;
use crate::session::worker::SessionWorker;
use crate::signal_channel::SignalConnector;
use huddle_core::{ConnectionId, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Handle to one call session. Cheap to clone; dropping the last clone
/// shuts the session down.
#[derive(Clone)]
pub struct CallSession {
    command_tx: mpsc::Sender<SessionCommand>,
}

impl CallSession {
    /// Dials the signaling server and spawns the session worker. Events
    /// for the UI/media layer arrive on the returned receiver.
    pub async fn connect(
        config: ClientConfig,
        media: Arc<dyn MediaSubsystem>,
        factory: Arc<dyn PeerTransportFactory>,
        connector: Arc<dyn SignalConnector>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ClientEvent>), ClientError> {
        let (channel, channel_rx) = connector.connect().await?;

        let (command_tx, command_rx) = mpsc::channel(64);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let worker = SessionWorker::new(
            config,
            media,
            factory,
            connector,
            channel,
            channel_rx,
            command_rx,
            events_tx,
        );
        tokio::spawn(worker.run());

        Ok((Self { command_tx }, events_rx))
    }

    /// Enters a room, optionally self-declaring as host. Empty room ids
    /// are rejected here, before any network traffic.
    pub async fn join(
        &self,
        room_id: impl Into<RoomId>,
        as_host: bool,
    ) -> Result<(), ClientError> {
        let room_id = room_id.into();
        if room_id.is_empty() {
            return Err(ClientError::EmptyRoomId);
        }

        self.request(|reply| SessionCommand::Join {
            room_id,
            as_host,
            reply,
        })
        .await
    }

    pub async fn leave(&self) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Leave { reply }).await
    }

    /// Flips local audio capture; returns the new enabled state.
    pub async fn toggle_local_audio(&self) -> Result<bool, ClientError> {
        self.toggle(|reply| SessionCommand::ToggleAudio { reply })
            .await
    }

    /// Flips local video capture; returns the new enabled state.
    pub async fn toggle_local_video(&self) -> Result<bool, ClientError> {
        self.toggle(|reply| SessionCommand::ToggleVideo { reply })
            .await
    }

    pub async fn kick(&self, user: ConnectionId) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Kick { user, reply })
            .await
    }

    pub async fn mute(&self, user: ConnectionId) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Mute { user, reply })
            .await
    }

    pub async fn promote(&self, user: ConnectionId) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Promote { user, reply })
            .await
    }

    pub async fn demote(&self, user: ConnectionId) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Demote { user, reply })
            .await
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<(), ClientError>>) -> SessionCommand,
    ) -> Result<(), ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| ClientError::SessionClosed)?;
        reply_rx.await.map_err(|_| ClientError::SessionClosed)?
    }

    async fn toggle(
        &self,
        make: impl FnOnce(oneshot::Sender<bool>) -> SessionCommand,
    ) -> Result<bool, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| ClientError::SessionClosed)?;
        reply_rx.await.map_err(|_| ClientError::SessionClosed)
    }
}
