use crate::signaling::relay_command::RelayCommand;
use crate::signaling::service::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ConnectionId, SignalRequest};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub relay_tx: mpsc::Sender<RelayCommand>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Ids are server-assigned at upgrade time. A reconnecting client gets
    // a fresh one and must run the join handshake again.
    let id = ConnectionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, id, state))
}

async fn handle_socket(socket: WebSocket, id: ConnectionId, state: Arc<AppState>) {
    info!("New WebSocket connection: {}", id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(id, tx);

    if state
        .relay_tx
        .send(RelayCommand::Connected { id })
        .await
        .is_err()
    {
        error!("Relay is gone, dropping connection {}", id);
        state.signaling.remove_peer(&id);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay_tx = state.relay_tx.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalRequest>(&text) {
                        Ok(request) => {
                            let cmd = RelayCommand::Incoming { from: id, request };
                            if let Err(e) = relay_tx.send(cmd).await {
                                error!("Relay died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid SignalRequest from {}: {:?}", id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Reached on either task ending, so the relay always learns about the
    // loss. A duplicate Disconnected for an already-removed id is a no-op.
    let _ = state.relay_tx.send(RelayCommand::Disconnected { id }).await;

    state.signaling.remove_peer(&id);
    info!("WebSocket disconnected: {}", id);
}
