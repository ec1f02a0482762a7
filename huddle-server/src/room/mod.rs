mod directory;
mod registry;

pub use directory::*;
pub use registry::*;
