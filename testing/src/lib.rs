//! # Taskdeck Testing
//!
//! Testing utilities and helpers for taskdeck reducers and stores.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - In-memory and failing key-value stores
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use taskdeck_testing::{test_clock, SequentialIdGenerator, InMemoryKeyValueStore};
//!
//! #[tokio::test]
//! async fn adds_a_todo() {
//!     let env = TodoEnvironment::new(
//!         Arc::new(test_clock()),
//!         Arc::new(SequentialIdGenerator::new()),
//!         Arc::new(SnapshotRepository::new(Arc::new(InMemoryKeyValueStore::new()))),
//!     );
//!     let store = Store::new(TodoState::default(), TodoReducer, env);
//!     // ...
//! }
//! ```

use chrono::{DateTime, Utc};
use taskdeck_core::environment::{Clock, IdGenerator};


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, PoisonError, RwLock};
    use taskdeck_core::storage::{KeyValueStore, StorageError, StorageFuture};
    use uuid::Uuid;

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until explicitly advanced. Clones share the
    /// same instant, so a test can keep a handle and move time forward
    /// while the environment holds another.
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck_testing::mocks::FixedClock;
    /// use taskdeck_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now());
    ///
    /// clock.advance(Duration::seconds(5));
    /// assert_eq!(clock.now() - time1, Duration::seconds(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock forward by `delta`
        pub fn advance(&self, delta: chrono::Duration) {
            let mut time = self.time.write().unwrap_or_else(PoisonError::into_inner);
            *time += delta;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable id generator: yields `00000000-0000-0000-0000-000000000001`,
    /// then `...0002`, and so on.
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id ends in `1`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(1),
            }
        }

        /// The id the `n`th call (1-based) returns
        #[must_use]
        pub const fn nth(n: u128) -> Uuid {
            Uuid::from_u128(n)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> Uuid {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            Uuid::from_u128(u128::from(n.max(1)))
        }
    }

    /// In-memory key-value store for fast, deterministic tests
    ///
    /// Clones share the same underlying map.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryKeyValueStore {
        entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    }

    impl InMemoryKeyValueStore {
        /// Create an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store pre-seeded with one raw value
        #[must_use]
        pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Self {
            let store = Self::new();
            store.insert_raw(key, value);
            store
        }

        /// Write a raw value, bypassing any serialization
        pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
            self.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.to_string(), value.into());
        }

        /// Read a raw value
        #[must_use]
        pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
            self.entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .cloned()
        }

        /// Whether `key` has been written
        #[must_use]
        pub fn contains_key(&self, key: &str) -> bool {
            self.raw(key).is_some()
        }

        /// Number of stored keys
        #[must_use]
        pub fn len(&self) -> usize {
            self.entries
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing has been written
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl KeyValueStore for InMemoryKeyValueStore {
        fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>> {
            Box::pin(async move { Ok(self.raw(key)) })
        }

        fn set<'a>(&'a self, key: &'a str, value: &'a [u8]) -> StorageFuture<'a, ()> {
            Box::pin(async move {
                self.insert_raw(key, value);
                Ok(())
            })
        }
    }

    /// Key-value store whose every operation fails with the configured error
    #[derive(Debug, Clone)]
    pub struct FailingKeyValueStore {
        error: StorageError,
    }

    impl FailingKeyValueStore {
        /// Fail every call with `error`
        #[must_use]
        pub const fn new(error: StorageError) -> Self {
            Self { error }
        }

        /// Fail every call as if storage were disabled
        #[must_use]
        pub fn unavailable() -> Self {
            Self::new(StorageError::Unavailable("storage disabled".to_string()))
        }
    }

    impl KeyValueStore for FailingKeyValueStore {
        fn get<'a>(&'a self, _key: &'a str) -> StorageFuture<'a, Option<Vec<u8>>> {
            let error = self.error.clone();
            Box::pin(async move { Err(error) })
        }

        fn set<'a>(&'a self, _key: &'a str, _value: &'a [u8]) -> StorageFuture<'a, ()> {
            let error = self.error.clone();
            Box::pin(async move { Err(error) })
        }
    }
}

// Re-export commonly used items
pub use mocks::{
    test_clock, FailingKeyValueStore, FixedClock, InMemoryKeyValueStore, SequentialIdGenerator,
};
