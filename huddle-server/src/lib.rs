pub mod config;
pub mod room;
pub mod signaling;

pub use config::ServerConfig;
pub use room::{RoomDirectory, SessionRegistry};
pub use signaling::{
    AppState, RelayCommand, SignalSink, SignalingRelay, SignalingService, ws_handler,
};
