//! Worker transport errors.

use std::io;
use thiserror::Error;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur while talking to the worker.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("failed to spawn worker process: {0}")]
    SpawnFailed(#[source] io::Error),

    #[error("failed to write to worker: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("worker process exited unexpectedly")]
    WorkerExited,

    /// The response channel closed before a reply arrived.
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// The engine rejected the request.
    #[error("worker error: {message} (code: {code})")]
    Remote { code: String, message: String },

    #[error("driver not found: {0}")]
    DriverNotFound(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),
}

impl WorkerError {
    /// Create a remote error from an error response.
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The worker is gone and every further request will fail.
    pub fn is_worker_exited(&self) -> bool {
        matches!(self, Self::WorkerExited | Self::ChannelClosed)
    }

    /// The request may succeed if sent again.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ConnectionFailed(_))
    }
}
