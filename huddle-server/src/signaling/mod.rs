mod host_control;
mod relay;
mod relay_command;
mod service;
mod sink;
mod ws_handler;

pub use relay::*;
pub use relay_command::*;
pub use service::*;
pub use sink::*;
pub use ws_handler::*;
