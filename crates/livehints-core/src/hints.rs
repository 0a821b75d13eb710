//! Hint generation from document snapshots and live process data.

use crate::document::Snapshot;
use crate::error::{LiveHintsError, Result};
use crate::live_data::{LiveDataProvider, LiveEntry, LiveProcessData};
use crate::project::ProjectContext;
use std::sync::Arc;
use tower_lsp_server::ls_types::{CodeLens, Command, Position, Range};

/// Command attached to every generated code lens.
pub const SHOW_LIVE_DATA_COMMAND: &str = "livehints.showLiveData";

/// Maximum document size (in bytes) scanned for symbols (10MB).
pub const MAX_DOCUMENT_SIZE: usize = 10_000_000;

/// Computes presentation hints for one document.
///
/// Called from the update worker only, so implementations never run
/// concurrently with each other. Returned hints replace everything previously
/// shown for the document.
pub trait HintGenerator: Send + Sync {
    fn compute_hints(&self, snapshot: &Snapshot, project: &ProjectContext)
    -> Result<Vec<CodeLens>>;
}

/// Generates one code lens per symbol occurrence for every live process that
/// was launched from the document's project.
///
/// # Examples
///
/// ```
/// use livehints_core::document::Snapshot;
/// use livehints_core::hints::{HintGenerator, LiveDataHintGenerator};
/// use livehints_core::live_data::{LiveDataProvider, LiveEntry, LiveProcessData};
/// use livehints_core::project::ProjectContext;
/// use std::sync::Arc;
/// use tower_lsp_server::ls_types::Uri;
///
/// let provider = Arc::new(LiveDataProvider::new());
/// provider.update(LiveProcessData {
///     process_key: "4711".into(),
///     process_name: "shop-app".into(),
///     project_name: Some("shop".into()),
///     entries: vec![LiveEntry {
///         symbol: "OrderService".into(),
///         label: "bean: orderService".into(),
///         detail: None,
///     }],
/// });
///
/// let generator = LiveDataHintGenerator::new(provider);
/// let uri = Uri::from_file_path("/shop/src/OrderService.java").unwrap();
/// let snapshot = Snapshot::new(uri, 1, "java", "class OrderService {}");
///
/// let hints = generator
///     .compute_hints(&snapshot, &ProjectContext::new("shop", "/shop"))
///     .unwrap();
/// assert_eq!(hints.len(), 1);
/// assert_eq!(hints[0].range.start.character, 6);
/// ```
#[derive(Debug, Clone)]
pub struct LiveDataHintGenerator {
    provider: Arc<LiveDataProvider>,
}

impl LiveDataHintGenerator {
    pub fn new(provider: Arc<LiveDataProvider>) -> Self {
        Self { provider }
    }
}

impl HintGenerator for LiveDataHintGenerator {
    fn compute_hints(
        &self,
        snapshot: &Snapshot,
        project: &ProjectContext,
    ) -> Result<Vec<CodeLens>> {
        if snapshot.text.len() > MAX_DOCUMENT_SIZE {
            return Err(LiveHintsError::DocumentTooLarge {
                uri: snapshot.uri.as_str().to_string(),
                size: snapshot.text.len(),
            });
        }

        let processes = self.provider.processes_for_project(&project.name);
        if processes.is_empty() {
            return Ok(vec![]);
        }

        let mut lenses = Vec::new();
        for process in &processes {
            for entry in &process.entries {
                if entry.symbol.is_empty() {
                    continue;
                }
                for range in find_symbol_ranges(&snapshot.text, &entry.symbol) {
                    lenses.push(live_lens(range, process, entry));
                }
            }
        }

        lenses.sort_by(|a, b| {
            let key = |lens: &CodeLens| {
                (
                    lens.range.start.line,
                    lens.range.start.character,
                    lens.command.as_ref().map(|c| c.title.clone()),
                )
            };
            key(a).cmp(&key(b))
        });

        tracing::trace!(
            "computed {} hints for {:?} from {} processes",
            lenses.len(),
            snapshot.uri,
            processes.len()
        );
        Ok(lenses)
    }
}

fn live_lens(range: Range, process: &LiveProcessData, entry: &LiveEntry) -> CodeLens {
    CodeLens {
        range,
        command: Some(Command {
            title: entry.label.clone(),
            command: SHOW_LIVE_DATA_COMMAND.into(),
            arguments: Some(vec![serde_json::json!({
                "processKey": process.process_key,
                "processName": process.process_name,
                "symbol": entry.symbol,
                "detail": entry.detail,
            })]),
        }),
        data: None,
    }
}

/// Finds whole-word occurrences of `symbol`, with UTF-16 positions.
fn find_symbol_ranges(text: &str, symbol: &str) -> Vec<Range> {
    let symbol_len = symbol.encode_utf16().count() as u32;
    let mut ranges = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        for (byte_idx, _) in line.match_indices(symbol) {
            let before = line[..byte_idx].chars().next_back();
            let after = line[byte_idx + symbol.len()..].chars().next();
            if before.is_some_and(is_ident_char) || after.is_some_and(is_ident_char) {
                continue;
            }

            let character = line[..byte_idx].encode_utf16().count() as u32;
            let line = line_idx as u32;
            ranges.push(Range::new(
                Position::new(line, character),
                Position::new(line, character + symbol_len),
            ));
        }
    }

    ranges
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
