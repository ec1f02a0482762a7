mod link;
mod orchestrator;
mod transport;

pub use link::*;
pub use orchestrator::*;
pub use transport::*;
