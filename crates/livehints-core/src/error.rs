use thiserror::Error;

/// Core error types for livehints.
///
/// Errors never reach the callers of `watch`, `unwatch` or the live data
/// handlers. They are produced by collaborators (hint generators, publishers)
/// and logged at the per-document granularity by the update worker.
///
/// # Examples
///
/// ```
/// use livehints_core::error::{LiveHintsError, Result};
///
/// fn check_size(uri: &str, text: &str) -> Result<()> {
///     if text.len() > 16 {
///         return Err(LiveHintsError::DocumentTooLarge {
///             uri: uri.into(),
///             size: text.len(),
///         });
///     }
///     Ok(())
/// }
///
/// assert!(check_size("file:///a.java", "class A {}").is_ok());
/// ```
#[derive(Error, Debug)]
pub enum LiveHintsError {
    #[error("failed to compute hints for {uri}: {source}")]
    HintGeneration {
        uri: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("document {uri} is too large for hint computation ({size} bytes)")]
    DocumentTooLarge { uri: String, size: usize },

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("update sequencer is closed")]
    SequencerClosed,
}

/// Convenience type alias for `Result<T, LiveHintsError>`.
pub type Result<T> = std::result::Result<T, LiveHintsError>;
