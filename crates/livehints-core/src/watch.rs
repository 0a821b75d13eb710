//! Registry of watched documents.
//!
//! Each watched document owns a [`WatchEntry`] carrying its lazily resolved
//! project context. The registry is a `DashMap`, so lifecycle callbacks and
//! the update worker can insert, remove and iterate concurrently.

use crate::project::ProjectContext;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tower_lsp_server::ls_types::Uri;

/// Per-document watch state.
///
/// The project context is assigned at most once. `Some(None)` from
/// [`WatchEntry::cached_project`] means resolution ran and found nothing;
/// that result is kept just like a successful one.
#[derive(Debug, Default)]
pub struct WatchEntry {
    project: OnceCell<Option<ProjectContext>>,
}

impl WatchEntry {
    pub fn new() -> Self {
        Self {
            project: OnceCell::new(),
        }
    }

    /// Returns the cached project context, resolving it first if needed.
    ///
    /// Concurrent first callers share a single invocation of `resolve`; every
    /// caller observes the value that was stored.
    pub async fn project_or_resolve<F, Fut>(&self, resolve: F) -> Option<ProjectContext>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<ProjectContext>>,
    {
        self.project.get_or_init(resolve).await.clone()
    }

    /// Returns the stored resolution result without resolving.
    ///
    /// `None` means resolution has not completed yet.
    pub fn cached_project(&self) -> Option<&Option<ProjectContext>> {
        self.project.get()
    }
}

/// Set of currently watched documents.
///
/// # Examples
///
/// ```
/// use livehints_core::watch::WatchRegistry;
/// use tower_lsp_server::ls_types::Uri;
///
/// let registry = WatchRegistry::new();
/// let uri = Uri::from_file_path("/project/src/Main.java").unwrap();
///
/// assert!(registry.insert_if_absent(uri.clone()));
/// assert!(!registry.insert_if_absent(uri.clone()));
/// assert_eq!(registry.len(), 1);
///
/// assert!(registry.remove(&uri));
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct WatchRegistry {
    entries: DashMap<Uri, Arc<WatchEntry>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Inserts a fresh entry unless one already exists.
    ///
    /// Returns `true` if a new entry was created. An existing entry keeps its
    /// cached project context.
    pub fn insert_if_absent(&self, uri: Uri) -> bool {
        match self.entries.entry(uri) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(WatchEntry::new()));
                true
            }
        }
    }

    /// Removes the entry for `uri`, returning whether it existed.
    pub fn remove(&self, uri: &Uri) -> bool {
        self.entries.remove(uri).is_some()
    }

    /// Returns a handle to the entry for `uri`.
    ///
    /// The handle stays valid after the entry is removed from the registry, so
    /// the map shard lock is never held while a caller awaits.
    pub fn get(&self, uri: &Uri) -> Option<Arc<WatchEntry>> {
        self.entries.get(uri).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, uri: &Uri) -> bool {
        self.entries.contains_key(uri)
    }

    /// Returns a point-in-time copy of the watched keys.
    pub fn keys(&self) -> Vec<Uri> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
