//! Error types for the shard module
//!
//! Shard errors are soft at the query level: the engine folds them into
//! diagnostics and keeps going with the remaining shards. They only surface
//! directly from the writer and from direct reader calls.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during shard operations
#[derive(Error, Debug)]
pub enum ShardError {
    /// File name does not match the shard naming pattern
    #[error("Invalid shard name: {0}")]
    InvalidName(String),

    /// Shard contents are not a JSON array of records
    #[error("Corrupt shard {path:?}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Timestamp could not be decoded
    #[error("Timestamp error: {0}")]
    Timestamp(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for shard operations
pub type ShardResult<T> = std::result::Result<T, ShardError>;

impl ShardError {
    /// Create a new invalid name error
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName(name.into())
    }

    /// Create a new corrupt shard error
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new timestamp error
    pub fn timestamp(message: impl Into<String>) -> Self {
        Self::Timestamp(message.into())
    }

    /// Check if this is an invalid name error
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, Self::InvalidName(_))
    }

    /// Check if this is a corrupt shard error
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
