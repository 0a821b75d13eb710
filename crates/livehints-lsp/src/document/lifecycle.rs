//! Document open/change/close handling.
//!
//! Keeps the document store current and tells the hint updater about every
//! content change and close.

use super::state::ServerState;
use tower_lsp_server::ls_types::{TextDocumentItem, Uri};

/// Stores the opened document and watches it if its language is recognized.
pub fn handle_document_open(state: &ServerState, document: TextDocumentItem) {
    let snapshot = state.documents.open(
        document.uri,
        document.version,
        document.language_id,
        document.text,
    );

    tracing::info!(
        "opened {:?} ({}, version {})",
        snapshot.uri,
        snapshot.language_id,
        snapshot.version
    );
    state.updater.on_content_changed(&snapshot);
}

/// Applies a full-text change.
///
/// Changes for documents that were never opened, or that are older than the
/// stored version, are ignored.
pub fn handle_document_change(state: &ServerState, uri: &Uri, version: i32, text: String) {
    match state.documents.change(uri, version, text) {
        Some(snapshot) => state.updater.on_content_changed(&snapshot),
        None => tracing::debug!("ignoring change for {:?} (version {})", uri, version),
    }
}

/// Forgets the document and clears its hints.
///
/// The snapshot goes first so an update still in flight drops its hints; the
/// clear is tagged with the version the document had when it closed.
pub async fn handle_document_close(state: &ServerState, uri: &Uri) {
    tracing::info!("closed {:?}", uri);
    match state.documents.close(uri) {
        Some(last) => state.updater.unwatch_closed(uri, last.version).await,
        None => state.updater.on_closed(uri).await,
    }
}
