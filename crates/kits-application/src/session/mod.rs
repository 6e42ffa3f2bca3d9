mod registry;
mod runtime;

pub use registry::SessionRegistry;
pub use runtime::{EventReply, SessionHandle};
