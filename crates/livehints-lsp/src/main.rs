use livehints_lsp::notifications::methods;
use livehints_lsp::server::Backend;
use tower_lsp_server::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::build(Backend::new)
        .custom_method(methods::LIVE_DATA_UPDATED, Backend::live_data_updated)
        .custom_method(methods::LIVE_DATA_REMOVED, Backend::live_data_removed)
        .finish();

    Server::new(stdin, stdout, socket).serve(service).await;
}
