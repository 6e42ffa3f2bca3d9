pub mod cooldown;
pub mod error;
pub mod kit;
pub mod scheduler;
pub mod session;
pub mod ui;

// Re-export common error type
pub use error::{KitsError, Result};
