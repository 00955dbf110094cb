//! # Error Types
//!
//! Defines error types shared by storage adapters.

use thiserror::Error;

/// Infrastructure failure raised by a storage adapter.
///
/// Business-rule conflicts (duplicate membership, locked manifest) are not
/// storage errors; adapters report those through typed results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected by the backing store.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Stored data could not be decoded.
    #[error("Data corruption: {0}")]
    Corrupted(String),
}
