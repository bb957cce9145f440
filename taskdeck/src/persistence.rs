//! Persistence adapter: versioned snapshots over a key-value byte store.
//!
//! A snapshot is stored as JSON under a single key:
//!
//! ```json
//! { "version": 1, "todos": [..], "categories": [..] }
//! ```
//!
//! Loading never fails. A missing value, a read error or a payload that does
//! not parse all yield an empty [`AppState`]. Saving never fails either:
//! errors are logged and dropped, with no retry.

use crate::types::{AppState, Category, Todo};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taskdeck_core::storage::{KeyValueStore, StorageError, StorageFuture};
use tokio::sync::Mutex;

/// Version tag written with every snapshot
pub const CURRENT_VERSION: u32 = 1;

/// Key the snapshot is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "todo-app-state";

#[derive(Serialize)]
struct StoredSnapshot<'a> {
    version: u32,
    todos: &'a [Todo],
    categories: &'a [Category],
}

/// Payload as read back; every field may be absent in older formats.
///
/// `version` stays untyped so any tag other than the current one, including
/// a negative, fractional or string tag, goes through migration.
#[derive(Deserialize)]
struct StoredPayload {
    #[serde(default)]
    version: Option<serde_json::Value>,
    #[serde(default)]
    todos: Option<Vec<Todo>>,
    #[serde(default)]
    categories: Option<Vec<Category>>,
}

/// Reads and writes [`AppState`] snapshots through a [`KeyValueStore`]
///
/// Writes are ordered by revision: `save` skips any snapshot older than the
/// last one it wrote.
pub struct SnapshotRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
    last_saved: Mutex<Option<u64>>,
}

impl SnapshotRepository {
    /// Repository using [`DEFAULT_STORAGE_KEY`]
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    /// Repository storing its snapshot under `key`
    #[must_use]
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            last_saved: Mutex::new(None),
        }
    }

    /// Storage key in use
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored snapshot, falling back to an empty state
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> AppState {
        let bytes = match self.store.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::info!("No stored snapshot, starting empty");
                return AppState::default();
            },
            Err(error) => {
                tracing::warn!(%error, "Failed to read snapshot, starting empty");
                return AppState::default();
            },
        };

        match decode(&bytes) {
            Ok(state) => {
                tracing::info!(
                    todos = state.todos.len(),
                    categories = state.categories.len(),
                    "Loaded snapshot"
                );
                state
            },
            Err(error) => {
                tracing::warn!(%error, "Stored snapshot is malformed, starting empty");
                AppState::default()
            },
        }
    }

    /// Overwrite the stored snapshot with `state`
    ///
    /// `revision` orders concurrent saves; a save older than the last one
    /// attempted is skipped. Failures are logged and swallowed.
    #[tracing::instrument(skip(self, state), fields(key = %self.key))]
    pub async fn save(&self, revision: u64, state: &AppState) {
        // Held across the write so saves land one at a time.
        let mut last_saved = self.last_saved.lock().await;
        if last_saved.is_some_and(|last| revision < last) {
            tracing::debug!(?last_saved, "Skipping stale snapshot");
            return;
        }
        *last_saved = Some(revision);

        let result = match encode(state) {
            Ok(bytes) => self.store.set(&self.key, &bytes).await,
            Err(error) => Err(error),
        };

        match result {
            Ok(()) => tracing::debug!(todos = state.todos.len(), "Saved snapshot"),
            Err(error) => tracing::warn!(%error, "Failed to save snapshot"),
        }
    }
}

impl std::fmt::Debug for SnapshotRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotRepository")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Serialize `state` at [`CURRENT_VERSION`]
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if JSON encoding fails.
pub fn encode(state: &AppState) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(&StoredSnapshot {
        version: CURRENT_VERSION,
        todos: &state.todos,
        categories: &state.categories,
    })
    .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Parse a stored payload, migrating older versions
///
/// # Errors
///
/// Returns [`StorageError::Serialization`] if the bytes are not a snapshot.
pub fn decode(bytes: &[u8]) -> Result<AppState, StorageError> {
    let payload: StoredPayload =
        serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))?;

    let current = payload.version.as_ref().and_then(serde_json::Value::as_u64)
        == Some(u64::from(CURRENT_VERSION));
    if !current {
        tracing::info!(
            from = ?payload.version,
            to = CURRENT_VERSION,
            "Migrating stored snapshot"
        );
    }
    Ok(migrate(payload))
}

/// Fill in whatever an older payload lacks
fn migrate(payload: StoredPayload) -> AppState {
    AppState {
        todos: payload.todos.unwrap_or_default(),
        categories: payload.categories.unwrap_or_default(),
    }
}

/// Key-value store keeping one `<key>.json` file per key in a directory
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Store rooted at `dir` (created on first write)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', '\0']);
        if valid {
            Ok(self.dir.join(format!("{key}.json")))
        } else {
            Err(StorageError::Unavailable(format!("invalid storage key: {key:?}")))
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a [u8]) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            tokio::fs::create_dir_all(&self.dir).await?;

            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, value).await?;
            tokio::fs::rename(&tmp, &path).await?;
            Ok(())
        })
    }
}
