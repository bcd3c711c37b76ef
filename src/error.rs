//! Error types for the shared object store

use crate::core::region::RegionError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid namespace or backend at construction, or an undecodable index.
    #[error("store initialization failed: {message}")]
    Initialization { message: String },

    /// The value could not be serialized. Nothing was written.
    #[error("serialization failed for {handle:?}: {source}")]
    Serialization {
        handle: String,
        #[source]
        source: rmp_serde::encode::Error,
    },

    /// The stored bytes do not decode as the requested type.
    #[error("deserialization failed for {handle:?}: {source}")]
    Deserialization {
        handle: String,
        #[source]
        source: rmp_serde::decode::Error,
    },

    #[error("handle already exists: {0:?} (delete it first)")]
    HandleAlreadyExists(String),

    #[error("invalid handle {handle:?}: {reason}")]
    InvalidHandle {
        handle: String,
        reason: &'static str,
    },

    #[error("handle not found: {0:?}")]
    HandleNotFound(String),

    #[error("store for namespace {0:?} has been erased")]
    NotInitialized(String),

    #[error(transparent)]
    Region(#[from] RegionError),
}

impl StoreError {
    pub(crate) fn initialization(message: impl Into<String>) -> Self {
        StoreError::Initialization {
            message: message.into(),
        }
    }
}
