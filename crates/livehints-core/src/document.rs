//! Document snapshots and the store that serves the latest one per URI.

use dashmap::DashMap;
use std::sync::Arc;
use tower_lsp_server::ls_types::Uri;

/// Immutable view of an open document at one version.
///
/// The text is shared behind an `Arc`, so handing snapshots to the update
/// worker never copies document content.
///
/// # Examples
///
/// ```
/// use livehints_core::document::Snapshot;
/// use tower_lsp_server::ls_types::Uri;
///
/// let uri = Uri::from_file_path("/project/src/Main.java").unwrap();
/// let snapshot = Snapshot::new(uri, 3, "java", "class Main {}");
///
/// assert_eq!(snapshot.version, 3);
/// assert_eq!(snapshot.language_id, "java");
/// assert_eq!(&*snapshot.text, "class Main {}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub uri: Uri,
    pub version: i32,
    pub language_id: String,
    pub text: Arc<str>,
}

impl Snapshot {
    pub fn new(
        uri: Uri,
        version: i32,
        language_id: impl Into<String>,
        text: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            uri,
            version,
            language_id: language_id.into(),
            text: text.into(),
        }
    }
}

/// Source of the latest known snapshot for a document.
///
/// Returns `None` once the document has been closed.
pub trait SnapshotStore: Send + Sync {
    fn latest_snapshot(&self, uri: &Uri) -> Option<Snapshot>;
}

/// In-memory snapshot store for full-text synchronised documents.
///
/// Uses `DashMap` so lifecycle callbacks and the update worker can read and
/// write concurrently without a global lock.
///
/// # Examples
///
/// ```
/// use livehints_core::document::{DocumentStore, SnapshotStore};
/// use tower_lsp_server::ls_types::Uri;
///
/// let store = DocumentStore::new();
/// let uri = Uri::from_file_path("/project/src/Main.java").unwrap();
///
/// store.open(uri.clone(), 1, "java", "class Main {}");
/// store.change(&uri, 2, "class Main { int x; }");
/// assert_eq!(store.latest_snapshot(&uri).unwrap().version, 2);
///
/// store.close(&uri);
/// assert!(store.latest_snapshot(&uri).is_none());
/// ```
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Uri, Snapshot>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Stores the initial snapshot of a newly opened document.
    ///
    /// Replaces any previous snapshot stored under the same URI.
    pub fn open(
        &self,
        uri: Uri,
        version: i32,
        language_id: impl Into<String>,
        text: impl Into<Arc<str>>,
    ) -> Snapshot {
        let snapshot = Snapshot::new(uri.clone(), version, language_id, text);
        self.documents.insert(uri, snapshot.clone());
        snapshot
    }

    /// Replaces the text and version of an open document.
    ///
    /// Returns `None` if the document was never opened, since the language
    /// is unknown in that case, or if `version` is older than the stored one.
    pub fn change(&self, uri: &Uri, version: i32, text: impl Into<Arc<str>>) -> Option<Snapshot> {
        let mut entry = self.documents.get_mut(uri)?;
        if version < entry.version {
            tracing::debug!(
                "ignoring stale change for {:?}: version {} < {}",
                uri,
                version,
                entry.version
            );
            return None;
        }
        entry.version = version;
        entry.text = text.into();
        Some(entry.clone())
    }

    /// Removes the document and returns its last snapshot.
    pub fn close(&self, uri: &Uri) -> Option<Snapshot> {
        self.documents.remove(uri).map(|(_, snapshot)| snapshot)
    }

    /// Returns the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl SnapshotStore for DocumentStore {
    fn latest_snapshot(&self, uri: &Uri) -> Option<Snapshot> {
        self.documents.get(uri).map(|doc| doc.clone())
    }
}
