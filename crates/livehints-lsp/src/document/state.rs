use livehints_core::{
    BuildFileResolver, Collaborators, DocumentStore, HintPublisher, LiveDataHintGenerator,
    LiveDataProvider, LiveHintUpdater,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Global server state.
///
/// Owns the open documents, the live data reported by clients, and the
/// coordinator that keeps both in sync with the published hints.
///
/// Must be created inside a tokio runtime.
pub struct ServerState {
    /// Open documents by URI
    pub documents: Arc<DocumentStore>,
    /// Live data by process key
    pub live_data: Arc<LiveDataProvider>,
    /// Hint update coordinator
    pub updater: LiveHintUpdater,
    /// Forwards live data events to the updater
    listener: JoinHandle<()>,
}

impl ServerState {
    /// Creates a new server state with the bundled collaborators.
    pub fn new(publisher: Arc<dyn HintPublisher>) -> Self {
        let documents = Arc::new(DocumentStore::new());
        let live_data = Arc::new(LiveDataProvider::new());

        let updater = LiveHintUpdater::new(Collaborators {
            documents: documents.clone(),
            resolver: Arc::new(BuildFileResolver::new()),
            generator: Arc::new(LiveDataHintGenerator::new(Arc::clone(&live_data))),
            publisher,
        });
        let listener = updater.spawn_live_data_listener(live_data.subscribe());

        Self {
            documents,
            live_data,
            updater,
            listener,
        }
    }

    /// Leaves every watched document without hints.
    ///
    /// Publication is switched off and the update queue drained before the
    /// clears go out, so nothing scheduled earlier can publish after them.
    pub async fn shutdown(&self) {
        self.updater.set_highlights_enabled(false);
        if let Err(e) = self.updater.flush().await {
            tracing::warn!("pending live hint updates not drained: {}", e);
        }
        self.updater.cleanup_all().await;
    }
}

impl Drop for ServerState {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("documents", &self.documents.len())
            .field("live_processes", &self.live_data.len())
            .field("updater", &self.updater)
            .finish()
    }
}
