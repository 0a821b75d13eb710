//! Document management module.
//!
//! This module provides infrastructure for managing LSP documents:
//! - `state`: Server state shared by all handlers
//! - `lifecycle`: Document open/change/close event handling

mod lifecycle;
mod state;

pub use lifecycle::{handle_document_change, handle_document_close, handle_document_open};
pub use state::ServerState;
