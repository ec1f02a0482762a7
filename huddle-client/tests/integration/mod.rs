
use huddle_client::{CallSession, ClientConfig, ClientEvent};
use huddle_core::IceServerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{MockMedia, MockSignalConnector, MockTransportFactory};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn test_config() -> ClientConfig {
    let config = ClientConfig::new(vec![IceServerConfig {
        urls: vec!["stun:stun.example.org:3478".into()],
        username: None,
        credential: None,
    }])
    .expect("test ICE config");

    // Short delay so the reconnect scenarios do not stall the suite.
    config.with_reconnect_delay(Duration::from_millis(20))
}

/// A connected session plus handles to every mocked seam.
pub struct TestClient {
    pub session: CallSession,
    pub events: mpsc::UnboundedReceiver<ClientEvent>,
    pub media: Arc<MockMedia>,
    pub factory: Arc<MockTransportFactory>,
    pub connector: Arc<MockSignalConnector>,
}

pub async fn create_test_client() -> TestClient {
    let media = Arc::new(MockMedia::new());
    let factory = Arc::new(MockTransportFactory::new());
    let connector = Arc::new(MockSignalConnector::new());

    let (session, events) = CallSession::connect(
        test_config(),
        media.clone(),
        factory.clone(),
        connector.clone(),
    )
    .await
    .expect("session connect");

    TestClient {
        session,
        events,
        media,
        factory,
        connector,
    }
}

/// Next client event, failing the test if none arrives in time.
pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for client event")
        .expect("event channel closed")
}

/// Skips events until the predicate matches, failing the test if it
/// never does within the timeout.
pub async fn wait_for_event(
    rx: &mut mpsc::UnboundedReceiver<ClientEvent>,
    mut pred: impl FnMut(&ClientEvent) -> bool,
) -> ClientEvent {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let event = tokio::time::timeout_at(deadline, rx.recv())
            .await
            .expect("timed out waiting for client event")
            .expect("event channel closed");
        if pred(&event) {
            return event;
        }
        tracing::debug!("[TestClient] skipping {:?}", event);
    }
}
