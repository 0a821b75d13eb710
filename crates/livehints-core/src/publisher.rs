//! Publication of hint sets to the connected client.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tower_lsp_server::ls_types::{CodeLens, Uri, VersionedTextDocumentIdentifier};

/// Hint set for one document version, as sent to the client.
///
/// Clients replace all hints previously shown for `doc.uri`; an empty
/// `code_lenses` list clears them.
///
/// # Examples
///
/// ```
/// use livehints_core::publisher::HighlightParams;
/// use tower_lsp_server::ls_types::Uri;
///
/// let uri = Uri::from_file_path("/shop/src/App.java").unwrap();
/// let params = HighlightParams::clear(uri, 7);
///
/// let json = serde_json::to_value(&params).unwrap();
/// assert_eq!(json["doc"]["version"], 7);
/// assert_eq!(json["codeLenses"], serde_json::json!([]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightParams {
    pub doc: VersionedTextDocumentIdentifier,
    pub code_lenses: Vec<CodeLens>,
}

impl HighlightParams {
    pub fn new(uri: Uri, version: i32, code_lenses: Vec<CodeLens>) -> Self {
        Self {
            doc: VersionedTextDocumentIdentifier { uri, version },
            code_lenses,
        }
    }

    /// Params that remove every hint from the document.
    pub fn clear(uri: Uri, version: i32) -> Self {
        Self::new(uri, version, vec![])
    }

    pub fn is_clear(&self) -> bool {
        self.code_lenses.is_empty()
    }
}

/// Delivery target for hint sets.
///
/// Delivery is best effort: the coordinator logs errors and moves on.
#[async_trait]
pub trait HintPublisher: Send + Sync {
    async fn publish(&self, params: HighlightParams) -> Result<()>;
}
