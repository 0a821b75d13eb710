use crate::notifications::Highlight;
use async_trait::async_trait;
use livehints_core::{HighlightParams, HintPublisher, Result};
use tower_lsp_server::Client;

/// Publishes hint sets as `livehints/highlight` notifications.
///
/// Notifications sent before the client finished initializing are dropped by
/// the transport.
#[derive(Debug, Clone)]
pub struct ClientPublisher {
    client: Client,
}

impl ClientPublisher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HintPublisher for ClientPublisher {
    async fn publish(&self, params: HighlightParams) -> Result<()> {
        tracing::trace!(
            "sending {} hints for {:?}",
            params.code_lenses.len(),
            params.doc.uri
        );
        self.client.send_notification::<Highlight>(params).await;
        Ok(())
    }
}
