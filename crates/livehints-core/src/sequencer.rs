//! Sequential execution of update work.
//!
//! Every update request, whatever triggered it, goes through one unbounded
//! channel drained by a single worker task. Requests run strictly in arrival
//! order and never overlap, so an older computation can never publish after
//! a newer one.

use crate::error::{LiveHintsError, Result};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tower_lsp_server::ls_types::Uri;

/// A unit of work for the update worker.
#[derive(Debug)]
pub enum UpdateRequest {
    /// Recompute and publish hints for one document.
    One(Uri),
    /// Recompute and publish hints for every watched document.
    All,
    /// Completes once every request queued before it has run.
    Flush(oneshot::Sender<()>),
}

/// Work performed by the update worker.
#[async_trait]
pub trait UpdateHandler: Send + Sync + 'static {
    async fn update_one(&self, uri: &Uri) -> Result<()>;

    async fn update_all(&self) -> Result<()>;
}

/// Producer side of the update queue.
///
/// Cloning is cheap; all clones feed the same worker. The worker exits once
/// every clone has been dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct UpdateSequencer {
    sender: mpsc::UnboundedSender<UpdateRequest>,
}

impl UpdateSequencer {
    /// Spawns the worker task on the current tokio runtime.
    pub fn spawn<H: UpdateHandler>(handler: Arc<H>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(handler, receiver));
        (Self { sender }, worker)
    }

    pub fn schedule_one(&self, uri: Uri) -> Result<()> {
        self.send(UpdateRequest::One(uri))
    }

    pub fn schedule_all(&self) -> Result<()> {
        self.send(UpdateRequest::All)
    }

    /// Waits until all previously scheduled work has finished.
    pub async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.send(UpdateRequest::Flush(done))?;
        wait.await.map_err(|_| LiveHintsError::SequencerClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn send(&self, request: UpdateRequest) -> Result<()> {
        self.sender
            .send(request)
            .map_err(|_| LiveHintsError::SequencerClosed)
    }
}

async fn run_worker<H: UpdateHandler>(
    handler: Arc<H>,
    mut receiver: mpsc::UnboundedReceiver<UpdateRequest>,
) {
    tracing::debug!("update worker started");

    while let Some(request) = receiver.recv().await {
        match request {
            UpdateRequest::One(uri) => {
                let label = format!("update {}", uri.as_str());
                run_isolated(&label, handler.update_one(&uri)).await;
            }
            UpdateRequest::All => {
                run_isolated("update all", handler.update_all()).await;
            }
            UpdateRequest::Flush(done) => {
                // Receiver may have given up waiting; nothing to do then.
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("update worker stopped");
}

/// Runs one unit of work, containing both errors and panics.
pub(crate) async fn run_isolated<F>(label: &str, unit: F)
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(unit).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("{} failed: {}", label, e),
        Err(panic) => tracing::error!("{} panicked: {}", label, panic_message(&*panic)),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
