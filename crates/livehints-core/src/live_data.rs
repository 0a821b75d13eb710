//! Live data reported by running application processes.
//!
//! The provider keeps the latest data per process and broadcasts a
//! [`LiveDataEvent`] on every change. Events carry no guarantees beyond
//! "something changed": listeners are expected to recompute from the
//! provider's current state.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the change event channel.
///
/// Slow listeners observe `RecvError::Lagged` instead of blocking producers.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One observable fact about a running process, anchored to a source symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveEntry {
    /// Identifier searched for in document text (e.g. a class or bean name)
    pub symbol: String,
    /// Short text shown next to the symbol
    pub label: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Latest live data snapshot for one running process.
///
/// # Examples
///
/// ```
/// use livehints_core::live_data::LiveProcessData;
///
/// let json = r#"{
///     "processKey": "4711",
///     "processName": "shop-app",
///     "projectName": "shop",
///     "entries": [{ "symbol": "OrderService", "label": "bean: orderService" }]
/// }"#;
///
/// let data: LiveProcessData = serde_json::from_str(json).unwrap();
/// assert_eq!(data.project_name.as_deref(), Some("shop"));
/// assert_eq!(data.entries.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveProcessData {
    pub process_key: String,
    #[serde(default)]
    pub process_name: String,
    /// Project the process was launched from, if known
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub entries: Vec<LiveEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveDataEventKind {
    Updated,
    Removed,
}

/// Change notification emitted by [`LiveDataProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveDataEvent {
    pub process_key: String,
    pub kind: LiveDataEventKind,
}

/// Store of live process data with change broadcasting.
///
/// # Examples
///
/// ```
/// use livehints_core::live_data::{LiveDataEventKind, LiveDataProvider, LiveProcessData};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = LiveDataProvider::new();
/// let mut events = provider.subscribe();
///
/// provider.update(LiveProcessData {
///     process_key: "4711".into(),
///     process_name: "shop-app".into(),
///     project_name: Some("shop".into()),
///     entries: vec![],
/// });
///
/// let event = events.recv().await.unwrap();
/// assert_eq!(event.kind, LiveDataEventKind::Updated);
/// assert_eq!(provider.processes_for_project("shop").len(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct LiveDataProvider {
    processes: DashMap<String, LiveProcessData>,
    events: broadcast::Sender<LiveDataEvent>,
}

impl LiveDataProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            processes: DashMap::new(),
            events,
        }
    }

    /// Registers a listener for change events.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveDataEvent> {
        self.events.subscribe()
    }

    /// Inserts or replaces the data for a process and notifies listeners.
    pub fn update(&self, data: LiveProcessData) {
        let process_key = data.process_key.clone();
        tracing::debug!(
            "live data updated for process {} ({} entries)",
            process_key,
            data.entries.len()
        );
        self.processes.insert(process_key.clone(), data);
        self.notify(process_key, LiveDataEventKind::Updated);
    }

    /// Drops the data for a process and notifies listeners.
    ///
    /// Returns `false` without notifying if the process was unknown.
    pub fn remove(&self, process_key: &str) -> bool {
        if self.processes.remove(process_key).is_none() {
            return false;
        }
        tracing::debug!("live data removed for process {}", process_key);
        self.notify(process_key.to_string(), LiveDataEventKind::Removed);
        true
    }

    pub fn get(&self, process_key: &str) -> Option<LiveProcessData> {
        self.processes.get(process_key).map(|data| data.clone())
    }

    /// Returns the processes launched from the named project, ordered by key.
    pub fn processes_for_project(&self, project_name: &str) -> Vec<LiveProcessData> {
        let mut processes: Vec<LiveProcessData> = self
            .processes
            .iter()
            .filter(|entry| entry.project_name.as_deref() == Some(project_name))
            .map(|entry| entry.value().clone())
            .collect();
        processes.sort_by(|a, b| a.process_key.cmp(&b.process_key));
        processes
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    fn notify(&self, process_key: String, kind: LiveDataEventKind) {
        // No receivers is not an error: nobody is watching yet.
        let _ = self.events.send(LiveDataEvent { process_key, kind });
    }
}

impl Default for LiveDataProvider {
    fn default() -> Self {
        Self::new()
    }
}
