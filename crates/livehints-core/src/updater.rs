//! Live hint update coordinator.
//!
//! [`LiveHintUpdater`] keeps every watched document annotated with hints
//! computed from live process data. Content edits and live data changes both
//! enqueue work on one [`UpdateSequencer`]; closing a document clears its
//! hints right away.
//!
//! # Ordering
//!
//! All computation and publication for the whole registry happens on the
//! sequencer worker, one unit at a time and in scheduling order. Clears
//! (`unwatch`, `cleanup_all`) bypass the queue because they carry no data
//! that could go stale.
//!
//! Publications and clears share one lock. An update publishes only while its
//! document is still watched and still has a snapshot, both checked under
//! that lock, so an update racing a clear either lands before it or is
//! dropped.
//!
//! # Versions
//!
//! A publication is tagged with the version of the latest snapshot at publish
//! time. An edit that lands while hints are being computed therefore yields
//! hints one revision behind the tag until the edit's own update runs.

use crate::document::{Snapshot, SnapshotStore};
use crate::error::Result;
use crate::hints::HintGenerator;
use crate::live_data::LiveDataEvent;
use crate::project::{ProjectContext, ProjectResolver};
use crate::publisher::{HighlightParams, HintPublisher};
use crate::sequencer::{UpdateHandler, UpdateSequencer, run_isolated};
use crate::watch::WatchRegistry;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{Mutex, broadcast};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tower_lsp_server::ls_types::{CodeLens, Uri};

/// Language identifiers watched when no configuration says otherwise.
pub const DEFAULT_LANGUAGES: &[&str] = &["java", "kotlin", "rust"];

/// External services the coordinator calls into.
pub struct Collaborators {
    pub documents: Arc<dyn SnapshotStore>,
    pub resolver: Arc<dyn ProjectResolver>,
    pub generator: Arc<dyn HintGenerator>,
    pub publisher: Arc<dyn HintPublisher>,
}

/// Coordinates hint updates for watched documents.
///
/// Must be created inside a tokio runtime: construction spawns the update
/// worker. The worker stops when the updater is dropped.
///
/// # Examples
///
/// ```no_run
/// use livehints_core::document::DocumentStore;
/// use livehints_core::hints::LiveDataHintGenerator;
/// use livehints_core::live_data::LiveDataProvider;
/// use livehints_core::project::BuildFileResolver;
/// use livehints_core::publisher::HintPublisher;
/// use livehints_core::updater::{Collaborators, LiveHintUpdater};
/// use std::sync::Arc;
/// use tower_lsp_server::ls_types::Uri;
///
/// # async fn example(publisher: Arc<dyn HintPublisher>) {
/// let documents = Arc::new(DocumentStore::new());
/// let live_data = Arc::new(LiveDataProvider::new());
///
/// let updater = LiveHintUpdater::new(Collaborators {
///     documents: documents.clone(),
///     resolver: Arc::new(BuildFileResolver::new()),
///     generator: Arc::new(LiveDataHintGenerator::new(Arc::clone(&live_data))),
///     publisher,
/// });
/// updater.spawn_live_data_listener(live_data.subscribe());
///
/// let snapshot = documents.open(
///     Uri::from_file_path("/shop/src/App.java").unwrap(),
///     1,
///     "java",
///     "class App {}",
/// );
/// updater.on_content_changed(&snapshot);
/// # }
/// ```
pub struct LiveHintUpdater {
    inner: Arc<UpdaterInner>,
    sequencer: UpdateSequencer,
    worker: JoinHandle<()>,
    languages: RwLock<HashSet<String>>,
}

struct UpdaterInner {
    registry: WatchRegistry,
    documents: Arc<dyn SnapshotStore>,
    resolver: Arc<dyn ProjectResolver>,
    generator: Arc<dyn HintGenerator>,
    publisher: Arc<dyn HintPublisher>,
    highlights_enabled: AtomicBool,
    publish_lock: Mutex<()>,
}

impl LiveHintUpdater {
    pub fn new(collaborators: Collaborators) -> Self {
        let inner = Arc::new(UpdaterInner {
            registry: WatchRegistry::new(),
            documents: collaborators.documents,
            resolver: collaborators.resolver,
            generator: collaborators.generator,
            publisher: collaborators.publisher,
            highlights_enabled: AtomicBool::new(true),
            publish_lock: Mutex::new(()),
        });
        let (sequencer, worker) = UpdateSequencer::spawn(Arc::clone(&inner));

        Self {
            inner,
            sequencer,
            worker,
            languages: RwLock::new(DEFAULT_LANGUAGES.iter().map(|l| (*l).to_string()).collect()),
        }
    }

    /// Starts watching `uri` and schedules an update for it.
    ///
    /// An update is scheduled even if the document is already watched, so
    /// every edit gets fresh hints.
    pub fn watch(&self, uri: Uri) {
        if self.inner.registry.insert_if_absent(uri.clone()) {
            tracing::debug!("watching {:?}", uri);
        }
        if let Err(e) = self.sequencer.schedule_one(uri) {
            tracing::warn!("cannot schedule live hint update: {}", e);
        }
    }

    /// Stops watching `uri` and clears its hints.
    ///
    /// The clear is published even if `uri` was never watched.
    pub async fn unwatch(&self, uri: &Uri) {
        if self.inner.registry.remove(uri) {
            tracing::debug!("unwatched {:?}", uri);
        }
        self.inner.clear(uri).await;
    }

    /// Stops watching a document that was already removed from the snapshot
    /// store, clearing its hints at `last_version`.
    ///
    /// Call once the snapshot is gone: an update still running for the
    /// document then publishes nothing.
    pub async fn unwatch_closed(&self, uri: &Uri, last_version: i32) {
        if self.inner.registry.remove(uri) {
            tracing::debug!("unwatched closed {:?}", uri);
        }
        self.inner
            .send_clear(HighlightParams::clear(uri.clone(), last_version))
            .await;
    }

    /// Clears the hints of every watched document, keeping the watches.
    pub async fn cleanup_all(&self) {
        let uris = self.inner.registry.keys();
        tracing::debug!("clearing live hints for {} documents", uris.len());
        for uri in uris {
            self.inner.clear(&uri).await;
        }
    }

    /// Watches the document if its language is recognized.
    pub fn on_content_changed(&self, snapshot: &Snapshot) {
        if self.is_recognized_language(&snapshot.language_id) {
            self.watch(snapshot.uri.clone());
        }
    }

    pub async fn on_closed(&self, uri: &Uri) {
        self.unwatch(uri).await;
    }

    /// Schedules an update of every watched document.
    ///
    /// The event payload is ignored; any change may affect any document.
    pub fn on_live_data_changed(&self, event: &LiveDataEvent) {
        tracing::debug!(
            "live data {:?} for process {}",
            event.kind,
            event.process_key
        );
        self.schedule_update_all();
    }

    pub fn schedule_update_all(&self) {
        if let Err(e) = self.sequencer.schedule_all() {
            tracing::warn!("cannot schedule live hint update: {}", e);
        }
    }

    /// Forwards live data change events to the update queue.
    ///
    /// The task ends when the event channel closes or the updater is dropped.
    pub fn spawn_live_data_listener(
        &self,
        mut events: broadcast::Receiver<LiveDataEvent>,
    ) -> JoinHandle<()> {
        let sequencer = self.sequencer.clone();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        tracing::trace!("live data event: {:?}", event);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!("missed {} live data events", missed);
                    }
                    Err(RecvError::Closed) => break,
                }

                if sequencer.schedule_all().is_err() {
                    break;
                }
            }
            tracing::debug!("live data listener stopped");
        })
    }

    /// Returns the project context of a watched document, resolving it once.
    ///
    /// Returns `None` for unwatched documents, documents without a snapshot,
    /// and documents the resolver cannot place.
    pub async fn resolve_project(&self, uri: &Uri) -> Option<ProjectContext> {
        self.inner.resolve_project(uri).await
    }

    /// Enables or disables publication of computed hints.
    ///
    /// Re-enabling does not republish; the next trigger does.
    pub fn set_highlights_enabled(&self, enabled: bool) {
        let previous = self
            .inner
            .highlights_enabled
            .swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            tracing::info!("live hints {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    pub fn highlights_enabled(&self) -> bool {
        self.inner.highlights_enabled.load(Ordering::SeqCst)
    }

    /// Replaces the set of language identifiers that get watched.
    pub fn set_languages<I, S>(&self, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let languages: HashSet<String> = languages
            .into_iter()
            .map(|l| l.as_ref().to_lowercase())
            .collect();
        *self
            .languages
            .write()
            .unwrap_or_else(PoisonError::into_inner) = languages;
    }

    pub fn is_recognized_language(&self, language_id: &str) -> bool {
        self.languages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&language_id.to_lowercase())
    }

    pub fn is_watched(&self, uri: &Uri) -> bool {
        self.inner.registry.contains(uri)
    }

    pub fn watched_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Waits until every update scheduled so far has run.
    pub async fn flush(&self) -> Result<()> {
        self.sequencer.flush().await
    }
}

impl Drop for LiveHintUpdater {
    fn drop(&mut self) {
        // Listener tasks hold sequencer clones; abort so the worker can't
        // outlive the updater.
        self.worker.abort();
    }
}

impl std::fmt::Debug for LiveHintUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveHintUpdater")
            .field("watched", &self.inner.registry.len())
            .field("highlights_enabled", &self.highlights_enabled())
            .finish_non_exhaustive()
    }
}

impl UpdaterInner {
    async fn resolve_project(&self, uri: &Uri) -> Option<ProjectContext> {
        let entry = self.registry.get(uri)?;
        entry
            .project_or_resolve(|| self.identify_project(uri))
            .await
    }

    async fn identify_project(&self, uri: &Uri) -> Option<ProjectContext> {
        if self.documents.latest_snapshot(uri).is_none() {
            return None;
        }
        let project = self.resolver.resolve(uri).await;
        tracing::debug!("resolved project for {:?}: {:?}", uri, project);
        project
    }

    async fn update_key(&self, uri: &Uri) -> Result<()> {
        let project = self.resolve_project(uri).await;
        self.update(uri, project.as_ref()).await
    }

    async fn update(&self, uri: &Uri, project: Option<&ProjectContext>) -> Result<()> {
        if !self.highlights_enabled.load(Ordering::SeqCst) {
            return Ok(());
        }

        let Some(project) = project else {
            tracing::trace!("no project for {:?}, skipping", uri);
            return Ok(());
        };

        let Some(snapshot) = self.documents.latest_snapshot(uri) else {
            return Ok(());
        };

        let hints = self.generator.compute_hints(&snapshot, project)?;
        self.publish(uri, hints).await
    }

    async fn publish(&self, uri: &Uri, hints: Vec<CodeLens>) -> Result<()> {
        let _guard = self.publish_lock.lock().await;
        if !self.registry.contains(uri) {
            tracing::debug!("{:?} unwatched before publish, dropping hints", uri);
            return Ok(());
        }
        let Some(snapshot) = self.documents.latest_snapshot(uri) else {
            tracing::debug!("{:?} closed before publish, dropping hints", uri);
            return Ok(());
        };

        tracing::debug!(
            "publishing {} live hints for {:?} (version {})",
            hints.len(),
            uri,
            snapshot.version
        );
        self.publisher
            .publish(HighlightParams::new(uri.clone(), snapshot.version, hints))
            .await
    }

    /// Clears `uri` at the version of its latest snapshot, if it has one.
    async fn clear(&self, uri: &Uri) {
        let Some(snapshot) = self.documents.latest_snapshot(uri) else {
            tracing::debug!("{:?} has no snapshot, nothing to clear", uri);
            return;
        };
        self.send_clear(HighlightParams::clear(uri.clone(), snapshot.version))
            .await;
    }

    async fn send_clear(&self, params: HighlightParams) {
        let _guard = self.publish_lock.lock().await;
        let uri = params.doc.uri.clone();
        if let Err(e) = self.publisher.publish(params).await {
            tracing::warn!("failed to clear live hints for {:?}: {}", uri, e);
        }
    }
}

#[async_trait]
impl UpdateHandler for UpdaterInner {
    async fn update_one(&self, uri: &Uri) -> Result<()> {
        self.update_key(uri).await
    }

    async fn update_all(&self) -> Result<()> {
        let uris = self.registry.keys();
        if uris.is_empty() {
            return Ok(());
        }

        tracing::debug!("updating live hints for {} documents", uris.len());
        for uri in uris {
            let label = format!("update {}", uri.as_str());
            run_isolated(&label, self.update_key(&uri)).await;
        }
        Ok(())
    }
}
