use async_trait::async_trait;
use huddle_client::{ChannelEvent, SignalChannel, SignalConnector, SignalingError};
use huddle_core::{SignalEvent, SignalRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Mock outbound signaling half. Captures everything the session sends.
#[derive(Default)]
pub struct MockSignalChannel {
    sent: Mutex<Vec<SignalRequest>>,
    closed: AtomicBool,
}

impl MockSignalChannel {
    pub async fn sent(&self) -> Vec<SignalRequest> {
        self.sent.lock().await.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` requests were sent, or the timeout hits.
    pub async fn wait_for_sent(&self, n: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            if self.sent.lock().await.len() >= n {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl SignalChannel for MockSignalChannel {
    async fn send(&self, request: SignalRequest) -> Result<(), SignalingError> {
        if self.is_closed() {
            return Err(SignalingError::ChannelClosed);
        }
        tracing::debug!("[MockChannel] client -> server {:?}", request);
        self.sent.lock().await.push(request);
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Server end of one established mock connection: pushes signal events
/// (or a transport loss) into the session loop.
#[derive(Clone)]
pub struct MockServer {
    tx: mpsc::Sender<ChannelEvent>,
}

impl MockServer {
    pub async fn send(&self, event: SignalEvent) {
        let _ = self.tx.send(ChannelEvent::Signal(event)).await;
    }

    /// Simulates the transport dropping out from under the client.
    pub async fn drop_connection(&self) {
        let _ = self.tx.send(ChannelEvent::Closed).await;
    }
}

struct ConnectorInner {
    refuse: bool,
    connections: Vec<(Arc<MockSignalChannel>, MockServer)>,
}

/// Mock dialer. Every successful connect mints a fresh channel pair and
/// keeps hold of both ends for the test to inspect and drive.
pub struct MockSignalConnector {
    inner: Mutex<ConnectorInner>,
}

impl Default for MockSignalConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSignalConnector {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ConnectorInner {
                refuse: false,
                connections: Vec::new(),
            }),
        }
    }

    pub async fn set_refuse(&self, refuse: bool) {
        self.inner.lock().await.refuse = refuse;
    }

    /// Connections established so far; refused dials are not counted.
    pub async fn connect_count(&self) -> usize {
        self.inner.lock().await.connections.len()
    }

    /// The most recently established connection's client-visible channel.
    pub async fn channel(&self) -> Arc<MockSignalChannel> {
        let inner = self.inner.lock().await;
        let (channel, _) = inner.connections.last().expect("no connection established");
        channel.clone()
    }

    /// The server end of the most recent connection.
    pub async fn server(&self) -> MockServer {
        let inner = self.inner.lock().await;
        let (_, server) = inner.connections.last().expect("no connection established");
        server.clone()
    }

    /// Wait until `n` connections were established, or the timeout hits.
    pub async fn wait_for_connections(&self, n: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            if self.inner.lock().await.connections.len() >= n {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl SignalConnector for MockSignalConnector {
    async fn connect(
        &self,
    ) -> Result<(Arc<dyn SignalChannel>, mpsc::Receiver<ChannelEvent>), SignalingError> {
        let mut inner = self.inner.lock().await;
        if inner.refuse {
            return Err(SignalingError::Connect("server unreachable".into()));
        }

        let (tx, rx) = mpsc::channel(64);
        let channel = Arc::new(MockSignalChannel::default());
        inner
            .connections
            .push((channel.clone(), MockServer { tx }));

        Ok((channel, rx))
    }
}
