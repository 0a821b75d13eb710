//! Custom protocol extensions.
//!
//! - `livehints/highlight` (server → client): replaces the live hints shown
//!   for one document version.
//! - `livehints/liveDataUpdated` (client → server): latest data for one
//!   running process.
//! - `livehints/liveDataRemoved` (client → server): a process went away.

use livehints_core::HighlightParams;
use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::notification::Notification;

/// Custom method names.
pub mod methods {
    pub const HIGHLIGHT: &str = "livehints/highlight";
    pub const LIVE_DATA_UPDATED: &str = "livehints/liveDataUpdated";
    pub const LIVE_DATA_REMOVED: &str = "livehints/liveDataRemoved";
}

/// Server → client hint publication.
#[derive(Debug)]
pub enum Highlight {}

impl Notification for Highlight {
    type Params = HighlightParams;
    const METHOD: &'static str = methods::HIGHLIGHT;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveDataRemovedParams {
    pub process_key: String,
}
