//! Core of the livehints language server.
//!
//! Keeps open source documents annotated with hints derived from live data
//! reported by running application processes.
//!
//! # Architecture
//!
//! livehints-core defines:
//! - **Traits**: `SnapshotStore`, `ProjectResolver`, `HintGenerator`, `HintPublisher`
//! - **Coordinator**: `LiveHintUpdater`, which watches documents and funnels all
//!   hint computation through one sequential update worker
//! - **Bundled implementations**: an in-memory document store, a build file
//!   project resolver, and a live data provider with a matching hint generator
//! - **Error Types**: `LiveHintsError` for everything collaborators can report
//!
//! # Examples
//!
//! Plugging a custom publisher into the coordinator:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use livehints_core::{
//!     BuildFileResolver, Collaborators, DocumentStore, HighlightParams, HintPublisher,
//!     LiveDataHintGenerator, LiveDataProvider, LiveHintUpdater,
//! };
//! use std::sync::Arc;
//!
//! struct StdoutPublisher;
//!
//! #[async_trait]
//! impl HintPublisher for StdoutPublisher {
//!     async fn publish(&self, params: HighlightParams) -> livehints_core::Result<()> {
//!         println!("{} hints for {}", params.code_lenses.len(), params.doc.uri.as_str());
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() {
//! let live_data = Arc::new(LiveDataProvider::new());
//! let updater = LiveHintUpdater::new(Collaborators {
//!     documents: Arc::new(DocumentStore::new()),
//!     resolver: Arc::new(BuildFileResolver::new()),
//!     generator: Arc::new(LiveDataHintGenerator::new(Arc::clone(&live_data))),
//!     publisher: Arc::new(StdoutPublisher),
//! });
//! updater.spawn_live_data_listener(live_data.subscribe());
//! # }
//! ```

pub mod document;
pub mod error;
pub mod hints;
pub mod live_data;
pub mod project;
pub mod publisher;
pub mod sequencer;
pub mod updater;
pub mod watch;

// Re-export commonly used types
pub use document::{DocumentStore, Snapshot, SnapshotStore};
pub use error::{LiveHintsError, Result};
pub use hints::{HintGenerator, LiveDataHintGenerator, MAX_DOCUMENT_SIZE, SHOW_LIVE_DATA_COMMAND};
pub use live_data::{LiveDataEvent, LiveDataEventKind, LiveDataProvider, LiveEntry, LiveProcessData};
pub use project::{BuildFileResolver, ProjectContext, ProjectResolver};
pub use publisher::{HighlightParams, HintPublisher};
pub use sequencer::{UpdateHandler, UpdateRequest, UpdateSequencer};
pub use updater::{Collaborators, DEFAULT_LANGUAGES, LiveHintUpdater};
pub use watch::{WatchEntry, WatchRegistry};
