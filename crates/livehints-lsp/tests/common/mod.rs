//! Common test utilities for integration tests.
//!
//! This module provides shared infrastructure for LSP integration tests,
//! including the `LspClient` for communicating with the server binary and
//! helpers for laying out projects on disk.

#![allow(dead_code)] // Not every test binary uses every helper

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// A captured notification with ordering information.
#[derive(Debug, Clone)]
pub(crate) struct CapturedNotification {
    /// The LSP method name (e.g., "livehints/highlight").
    pub method: String,
    /// Sequence number for ordering (monotonically increasing).
    pub sequence: u64,
    /// The full notification parameters.
    pub params: Value,
}

/// LSP test client for communicating with the server binary.
pub(crate) struct LspClient {
    process: Child,
    /// Captured notifications in order received.
    notifications: Vec<CapturedNotification>,
    /// Monotonic counter for notification ordering.
    notification_counter: AtomicU64,
    /// Ids for requests sent by helpers.
    next_id: AtomicI64,
    reader: BufReader<std::process::ChildStdout>,
}

impl LspClient {
    /// Spawn the livehints-lsp binary.
    pub(crate) fn spawn() -> Self {
        let mut process = Command::new(env!("CARGO_BIN_EXE_livehints-lsp"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn livehints-lsp binary");

        let stdout = process.stdout.take().expect("Failed to capture stdout");

        Self {
            process,
            notifications: Vec::new(),
            notification_counter: AtomicU64::new(0),
            next_id: AtomicI64::new(100),
            reader: BufReader::new(stdout),
        }
    }

    /// Get all captured notifications.
    pub(crate) fn get_notifications(&self) -> Vec<CapturedNotification> {
        self.notifications.clone()
    }

    /// Captured notifications with the given method, in arrival order.
    pub(crate) fn notifications_for(&self, method: &str) -> Vec<CapturedNotification> {
        self.notifications
            .iter()
            .filter(|n| n.method == method)
            .cloned()
            .collect()
    }

    /// Clear all captured notifications.
    pub(crate) fn clear_notifications(&mut self) {
        self.notifications.clear();
        self.notification_counter.store(0, Ordering::SeqCst);
    }

    /// Trigger a read from the server stream by sending a dummy request.
    ///
    /// The server answers `workspace/symbol` with an error since it doesn't
    /// implement it, which is enough to drain pending notifications.
    pub(crate) fn flush_notifications(&mut self) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "workspace/symbol",
            "params": { "query": "" }
        }));
        let _ = self.read_response(Some(id));
    }

    /// Polls until a notification matching `predicate` has been captured.
    pub(crate) fn wait_for_notification<F>(
        &mut self,
        method: &str,
        predicate: F,
    ) -> Option<CapturedNotification>
    where
        F: Fn(&Value) -> bool,
    {
        for _ in 0..50 {
            self.flush_notifications();
            if let Some(found) = self
                .notifications
                .iter()
                .find(|n| n.method == method && predicate(&n.params))
            {
                return Some(found.clone());
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        None
    }

    /// Send a JSON-RPC message to the server.
    pub(crate) fn send(&mut self, message: &Value) {
        let body = serde_json::to_string(message).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        stdin.write_all(header.as_bytes()).unwrap();
        stdin.write_all(body.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    /// Send a notification to the server.
    pub(crate) fn notify(&mut self, method: &str, params: Value) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        }));
    }

    /// Read a JSON-RPC response from the server.
    ///
    /// Captures notifications and returns the first response with matching id,
    /// or any response/error if no id filter is provided.
    pub(crate) fn read_response(&mut self, expected_id: Option<i64>) -> Value {
        loop {
            // Read headers
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                let bytes_read = self
                    .reader
                    .read_line(&mut line)
                    .expect("Failed to read header");

                // EOF - server closed connection
                assert!(bytes_read != 0, "Server closed connection unexpectedly");

                if line == "\r\n" || line == "\n" {
                    break;
                }

                if line.to_lowercase().starts_with("content-length:") {
                    content_length = line
                        .split(':')
                        .nth(1)
                        .unwrap()
                        .trim()
                        .parse()
                        .expect("Invalid content length");
                }
            }

            if content_length == 0 {
                continue;
            }

            let mut body = vec![0u8; content_length];
            self.reader
                .read_exact(&mut body)
                .expect("Failed to read body");

            let message: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
                panic!("Invalid JSON: {e} in: {:?}", String::from_utf8_lossy(&body))
            });

            // Server → client requests carry both id and method; answer them
            // so the server isn't left waiting.
            if let (Some(id), Some(_)) = (message.get("id"), message.get("method")) {
                let reply = json!({ "jsonrpc": "2.0", "id": id, "result": null });
                self.send(&reply);
                continue;
            }

            if message.get("id").is_none() {
                if let Some(method) = message.get("method").and_then(|m| m.as_str()) {
                    let params = message.get("params").cloned().unwrap_or(Value::Null);
                    let sequence = self.notification_counter.fetch_add(1, Ordering::SeqCst);
                    self.notifications.push(CapturedNotification {
                        method: method.to_string(),
                        sequence,
                        params,
                    });
                }
                continue;
            }

            if let Some(id) = expected_id {
                if message.get("id") == Some(&json!(id)) {
                    return message;
                }
                continue;
            }

            return message;
        }
    }

    /// Initialize the LSP session with default options.
    pub(crate) fn initialize(&mut self) -> Value {
        self.initialize_with(Value::Null)
    }

    /// Initialize the LSP session with the given initialization options.
    pub(crate) fn initialize_with(&mut self, options: Value) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "processId": null,
                "capabilities": {},
                "rootUri": null,
                "initializationOptions": options,
                "workspaceFolders": null
            }
        }));

        let response = self.read_response(Some(1));

        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "initialized",
            "params": {}
        }));

        response
    }

    /// Open a text document at version 1.
    pub(crate) fn did_open(&mut self, uri: &str, language_id: &str, text: &str) {
        self.notify(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": language_id,
                    "version": 1,
                    "text": text
                }
            }),
        );
    }

    /// Replace the full text of a document.
    pub(crate) fn did_change(&mut self, uri: &str, version: i32, text: &str) {
        self.notify(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": uri, "version": version },
                "contentChanges": [{ "text": text }]
            }),
        );
    }

    pub(crate) fn did_close(&mut self, uri: &str) {
        self.notify(
            "textDocument/didClose",
            json!({ "textDocument": { "uri": uri } }),
        );
    }

    /// Report live data for one process.
    pub(crate) fn live_data_updated(&mut self, data: Value) {
        self.notify("livehints/liveDataUpdated", data);
    }

    pub(crate) fn live_data_removed(&mut self, process_key: &str) {
        self.notify(
            "livehints/liveDataRemoved",
            json!({ "processKey": process_key }),
        );
    }

    /// Run a workspace command.
    pub(crate) fn execute_command(&mut self, id: i64, command: &str, arguments: Value) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "workspace/executeCommand",
            "params": { "command": command, "arguments": arguments }
        }));
        self.read_response(Some(id))
    }

    /// Shutdown the server.
    pub(crate) fn shutdown(&mut self) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 999,
            "method": "shutdown"
        }));
        self.read_response(Some(999))
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

/// A Maven project named `shop` inside a temporary directory.
pub(crate) struct ShopProject {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl ShopProject {
    pub(crate) fn create() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().join("shop");
        std::fs::create_dir_all(root.join("src/main/java")).unwrap();
        std::fs::write(root.join("pom.xml"), "<project/>").unwrap();
        Self { _dir: dir, root }
    }

    /// `file://` URI of a source file under the project root.
    pub(crate) fn source_uri(&self, name: &str) -> String {
        file_uri(&self.root.join("src/main/java").join(name))
    }
}

pub(crate) fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Live data for a process launched from the `shop` project.
pub(crate) fn shop_live_data(process_key: &str, symbol: &str) -> Value {
    json!({
        "processKey": process_key,
        "processName": "shop-app",
        "projectName": "shop",
        "entries": [{
            "symbol": symbol,
            "label": format!("bean: {symbol}"),
            "detail": "singleton"
        }]
    })
}

/// Number of code lenses in a captured highlight notification.
pub(crate) fn lens_count(params: &Value) -> usize {
    params["codeLenses"].as_array().map_or(0, Vec::len)
}
