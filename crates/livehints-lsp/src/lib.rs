pub mod config;
pub mod document;
pub mod notifications;
pub mod publisher;
pub mod server;
mod test_utils;

// Re-export commonly used types
pub use livehints_core::{LiveHintsError, Result};
pub use server::Backend;
