use crate::config::LiveHintsConfig;
use crate::document::{
    ServerState, handle_document_change, handle_document_close, handle_document_open,
};
use crate::notifications::LiveDataRemovedParams;
use crate::publisher::ClientPublisher;
use livehints_core::LiveProcessData;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_lsp_server::ls_types::{
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, ExecuteCommandOptions, ExecuteCommandParams, InitializeParams,
    InitializeResult, InitializedParams, MessageType, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tower_lsp_server::{Client, LanguageServer, jsonrpc::Result};

/// LSP command identifiers.
mod commands {
    /// Command to recompute hints for every watched document.
    pub const REFRESH: &str = "livehints.refresh";
    pub use livehints_core::SHOW_LIVE_DATA_COMMAND as SHOW_LIVE_DATA;
}

pub struct Backend {
    pub(crate) client: Client,
    state: Arc<ServerState>,
    config: Arc<RwLock<LiveHintsConfig>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        let publisher = Arc::new(ClientPublisher::new(client.clone()));
        Self {
            client,
            state: Arc::new(ServerState::new(publisher)),
            config: Arc::new(RwLock::new(LiveHintsConfig::default())),
        }
    }

    /// Handles `livehints/liveDataUpdated`.
    pub async fn live_data_updated(&self, params: LiveProcessData) {
        self.state.live_data.update(params);
    }

    /// Handles `livehints/liveDataRemoved`.
    pub async fn live_data_removed(&self, params: LiveDataRemovedParams) {
        if !self.state.live_data.remove(&params.process_key) {
            tracing::debug!("no live data for process {}", params.process_key);
        }
    }

    /// Applies `config` unless it matches the one already in effect.
    ///
    /// Returns whether anything changed.
    async fn apply_config(&self, config: LiveHintsConfig) -> bool {
        let mut current = self.config.write().await;
        if *current == config {
            tracing::debug!("configuration unchanged");
            return false;
        }

        tracing::debug!("applying configuration: {:?}", config);
        self.state
            .updater
            .set_highlights_enabled(config.highlights.enabled);
        self.state
            .updater
            .set_languages(&config.documents.languages);
        *current = config;
        true
    }

    fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            execute_command_provider: Some(ExecuteCommandOptions {
                commands: vec![commands::REFRESH.into(), commands::SHOW_LIVE_DATA.into()],
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("initializing livehints-lsp server");

        if let Some(init_options) = params.initialization_options {
            match LiveHintsConfig::from_settings(init_options) {
                Ok(config) => {
                    self.apply_config(config).await;
                }
                Err(e) => tracing::warn!("invalid initialization options: {}", e),
            }
        }

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: "livehints-lsp".into(),
                version: Some(env!("CARGO_PKG_VERSION").into()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("livehints-lsp server initialized");
        self.client
            .log_message(MessageType::INFO, "livehints-lsp ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("shutting down livehints-lsp server");
        self.state.shutdown().await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        handle_document_open(&self.state, params.text_document);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // Full sync: the last change holds the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            handle_document_change(&self.state, &uri, version, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handle_document_close(&self.state, &params.text_document.uri).await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        match LiveHintsConfig::from_settings(params.settings) {
            Ok(config) => {
                if self.apply_config(config).await {
                    tracing::info!("configuration updated");
                }
            }
            Err(e) => {
                tracing::warn!("invalid configuration: {}", e);
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("livehints: invalid configuration: {}", e),
                    )
                    .await;
            }
        }
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<serde_json::Value>> {
        tracing::info!("execute_command: {:?}", params.command);

        match params.command.as_str() {
            commands::REFRESH => self.state.updater.schedule_update_all(),
            commands::SHOW_LIVE_DATA => {
                // Presentation is up to the client
                tracing::debug!("show live data: {:?}", params.arguments);
            }
            other => tracing::warn!("unknown command: {}", other),
        }

        Ok(None)
    }
}
