//! Error types for the TrustGate core.

use thiserror::Error;

/// Core error type for gateway operations.
///
/// Access evaluation itself never returns these: a broken store or
/// sink degrades the evaluation but still yields a decision. Errors
/// surface only from setup and from the read-side operations
/// (profiles and the decision log).
#[derive(Debug, Error)]
pub enum GateError {
    /// Behavior store error passthrough.
    #[error("store error: {0}")]
    Store(#[from] trustgate_store::StoreError),

    /// A decision sink could not record an event.
    #[error("sink '{sink}' failed: {message}")]
    Sink {
        /// Name of the failing sink.
        sink: &'static str,
        /// What went wrong.
        message: String,
    },

    /// The gateway was built without a decision log attached.
    #[error("no decision log is attached to this gateway")]
    LogUnavailable,
}
