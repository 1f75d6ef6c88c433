//! Typed failures shared by the store adapter, the aggregation engine and the
//! bulk delete coordinator. The UI layer still speaks `anyhow` like the rest of
//! the application shell; these enums exist so callers can tell a backend
//! rejection apart from a contract violation or a superseded collection.

use std::time::Duration;

use thiserror::Error;

/// A store operation that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend rejected the request. The message is meant for humans.
    #[error("{message}")]
    Remote { message: String },

    /// No answer arrived within the configured request timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The request was abandoned before it completed.
    #[error("request was cancelled")]
    Cancelled,
}

impl StoreError {
    pub fn remote<S: Into<String>>(message: S) -> Self {
        StoreError::Remote {
            message: message.into(),
        }
    }

    /// Flatten an `anyhow` chain into a remote failure, keeping the innermost
    /// cause since that is usually the one SQLite or the backend produced.
    pub fn from_chain(err: &anyhow::Error) -> Self {
        let message = err
            .chain()
            .last()
            .map(|cause| cause.to_string())
            .unwrap_or_else(|| err.to_string());
        StoreError::Remote { message }
    }
}

/// Errors raised by the routine core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The store handed back a routine that does not match the nested
    /// routine/exercise/muscle contract.
    #[error("routine {routine_id}: exercise #{position} has no usable `{field}`")]
    DataShape {
        routine_id: String,
        position: usize,
        field: &'static str,
    },

    #[error(transparent)]
    RemoteFailure(#[from] StoreError),

    /// A completion arrived for a collection that has since been replaced.
    #[error("collection generation {expected} was superseded by {current}")]
    StaleState { expected: u64, current: u64 },
}
