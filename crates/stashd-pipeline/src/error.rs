use stashd_core::StoreError;
use thiserror::Error;

/// Dispatcher-side enqueue failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The bounded queue is full. The dispatcher never blocks the caller;
    /// rejected work is recoverable by resubmitting the URL.
    #[error("processing queue is full")]
    Busy,
    /// The worker pool has shut down and no longer accepts signals.
    #[error("dispatcher is shut down")]
    Closed,
}

/// Failures surfaced by [`crate::IngestGate::submit`].
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("processing queue is full, try again later")]
    Busy,
    #[error("service is shutting down")]
    ShuttingDown,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DispatchError> for IngestError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Busy => IngestError::Busy,
            DispatchError::Closed => IngestError::ShuttingDown,
        }
    }
}
