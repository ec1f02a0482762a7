mod command;
mod handle;
mod worker;

pub use handle::CallSession;

pub(crate) use command::SessionCommand;
pub(crate) use worker::SessionWorker;
