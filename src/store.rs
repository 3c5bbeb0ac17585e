//! Main Store struct tying all components together.

use crate::dispatch::{Dispatcher, Operation, Output};
use crate::error::Result;
use crate::snapshots::Snapshot;
use crate::types::{StoreStats, Timestamp};
use parking_lot::Mutex;

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Clock value before the first operation arrives.
    pub initial_time: Timestamp,

    /// Whether BACKUP also drops expired entries from the live state.
    ///
    /// Off by default. Only safe when no operation, RESTORE included, is
    /// ever timed before an earlier BACKUP.
    pub prune_on_backup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_time: Timestamp(0),
            prune_on_backup: false,
        }
    }
}

/// Shareable handle over a [`Dispatcher`].
///
/// Every call takes one lock for its whole duration, so operations from
/// different threads are applied one at a time, each to completion.
pub struct Store {
    config: StoreConfig,
    inner: Mutex<Dispatcher>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Store {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        let inner = Mutex::new(Dispatcher::with_config(&config));
        Self { config, inner }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Apply a single operation.
    pub fn apply(&self, operation: Operation) -> Option<Output> {
        self.inner.lock().apply(operation)
    }

    /// Decode and apply a single tokenized record.
    pub fn apply_record<S: AsRef<str>>(&self, record: &[S]) -> Result<Option<Output>> {
        self.inner.lock().apply_record(record)
    }

    /// Apply a batch of operations under one lock.
    pub fn run<I>(&self, operations: I) -> Vec<String>
    where
        I: IntoIterator<Item = Operation>,
    {
        self.inner.lock().run(operations)
    }

    /// Decode and apply a batch of tokenized records under one lock.
    pub fn run_records<S, R>(&self, records: &[R]) -> Result<Vec<String>>
    where
        S: AsRef<str>,
        R: AsRef<[S]>,
    {
        self.inner.lock().run_records(records)
    }

    /// Apply a JSON array of string arrays, e.g.
    /// `[["SET", "1", "k", "a", "x"], ["GET", "2", "k", "a"]]`.
    pub fn run_json(&self, input: &str) -> Result<Vec<String>> {
        let records: Vec<Vec<String>> = serde_json::from_str(input)?;
        self.run_records(&records)
    }

    /// Current logical time.
    pub fn now(&self) -> Timestamp {
        self.inner.lock().now()
    }

    /// Value of `key.field` at the current logical time, without moving the
    /// clock.
    pub fn peek(&self, key: &str, field: &str) -> Option<String> {
        let inner = self.inner.lock();
        inner
            .entities()
            .get(key, field, inner.now())
            .map(str::to_string)
    }

    /// Copy of snapshot `index`.
    pub fn snapshot(&self, index: usize) -> Option<Snapshot> {
        self.inner.lock().snapshots().get(index).cloned()
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.lock();
        let now = inner.now();
        let entities = inner.entities();

        StoreStats {
            current_time: now,
            key_count: entities.key_count() as u64,
            stored_entries: entities.stored_entries() as u64,
            alive_entries: entities.alive_count(now) as u64,
            snapshot_count: inner.snapshots().len() as u64,
        }
    }
}
