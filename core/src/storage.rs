//! Key-value byte storage.
//!
//! Persistence adapters sit on top of a [`KeyValueStore`]: an opaque
//! `get` / `set` over byte values. The trait is deliberately small; it is the
//! Rust stand-in for browser local storage, a file per key, or an in-memory map
//! in tests.
//!
//! # Implementations
//!
//! - `FileKeyValueStore` (in the `taskdeck` crate): one JSON file per key
//! - `InMemoryKeyValueStore` (in `taskdeck-testing`): `HashMap`-backed
//! - `FailingKeyValueStore` (in `taskdeck-testing`): every call errors
//!
//! # Example
//!
//! ```no_run
//! use taskdeck_core::storage::{KeyValueStore, StorageError};
//!
//! async fn copy<S: KeyValueStore>(store: &S) -> Result<(), StorageError> {
//!     if let Some(bytes) = store.get("todo-app-state").await? {
//!         store.set("todo-app-state.bak", &bytes).await?;
//!     }
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during key-value store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store cannot be reached (missing directory, disabled storage).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backing store refused the write because it is full.
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                Self::Unavailable(error.to_string())
            },
            _ => Self::Io(error.to_string()),
        }
    }
}

/// Type alias for boxed storage futures
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Key-value byte store.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of using `async fn` so the store can
/// be shared as `Arc<dyn KeyValueStore>` and captured by effects.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Some(bytes)` if a value is stored
    /// - `None` if the key has never been written
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store cannot be read.
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be written.
    fn set<'a>(&'a self, key: &'a str, value: &'a [u8]) -> StorageFuture<'a, ()>;
}
