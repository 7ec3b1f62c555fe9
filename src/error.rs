//! Error handling for hygrolog
//!
//! This module provides the crate-level error type and result alias. Only
//! two error kinds ever abort a query: an invalid caller-supplied window and
//! an unlistable shard directory. Everything else the storage layer can
//! throw at us is degraded to diagnostics by the query engine.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in hygrolog operations
#[derive(Error, Debug)]
pub enum Error {
    /// The caller-supplied duration or time range is nonsensical
    #[error("Invalid query window: {0}")]
    InvalidWindow(String),

    /// The shard directory cannot be listed
    #[error("Storage unavailable at {path:?}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for hygrolog operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid window error
    pub fn invalid_window(message: impl Into<String>) -> Self {
        Self::InvalidWindow(message.into())
    }

    /// Create a new storage unavailable error
    pub fn storage_unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is an invalid window error
    pub fn is_invalid_window(&self) -> bool {
        matches!(self, Self::InvalidWindow(_))
    }

    /// Check if this is a storage unavailable error
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
