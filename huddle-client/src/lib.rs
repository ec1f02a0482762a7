pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod peer;
pub mod session;
pub mod signal_channel;

pub use config::ClientConfig;
pub use error::ClientError;
pub use events::ClientEvent;
pub use media::{LocalTrack, MediaError, MediaSubsystem, StreamHandle, TrackKind};
pub use peer::{
    LinkState, NegotiationOutcome, PeerEvent, PeerOrchestrator, PeerTransport,
    PeerTransportFactory, TransportError, TransportEvent,
};
pub use session::CallSession;
pub use signal_channel::{ChannelEvent, SignalChannel, SignalConnector, SignalingError};
