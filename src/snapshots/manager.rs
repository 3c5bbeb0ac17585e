//! Snapshot manager implementation.

use crate::entities::{EntityStore, KeyBucket};
use crate::types::{Entry, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// An immutable copy of the live state at one moment.
///
/// Entries keep the absolute expiry they had when copied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    index: usize,
    taken_at: Timestamp,
    entry_count: usize,
    keys: HashMap<String, KeyBucket>,
}

impl Snapshot {
    /// Position in creation order, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Logical time the backup was taken at.
    pub fn taken_at(&self) -> Timestamp {
        self.taken_at
    }

    /// Number of `(key, field)` pairs captured.
    pub fn len(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Captured entry for `key.field`.
    pub fn get(&self, key: &str, field: &str) -> Option<&Entry> {
        self.keys.get(key).and_then(|bucket| bucket.entry(field))
    }

    /// Captured `(key, field, entry)` triples. Keys come in no particular
    /// order; fields within a key are sorted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Entry)> + '_ {
        self.keys.iter().flat_map(|(key, bucket)| {
            bucket
                .iter()
                .map(move |(field, entry)| (key.as_str(), field, entry))
        })
    }

    /// Fresh, independent copy of the captured state.
    fn to_live(&self) -> HashMap<String, KeyBucket> {
        self.keys.clone()
    }
}

/// Owns the ordered list of snapshots.
#[derive(Clone, Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    prune_on_backup: bool,
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self {
            snapshots: Vec::new(),
            prune_on_backup: false,
        }
    }
}

impl SnapshotManager {
    /// Create an empty manager that leaves expired live entries in place.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether BACKUP also reclaims expired entries from the live state.
    ///
    /// Only unobservable while no later operation, RESTORE included, runs
    /// at a time before the backup. A RESTORE that goes back in time would
    /// otherwise find reclaimed entries missing, even when its index misses.
    pub fn with_prune_on_backup(mut self, prune: bool) -> Self {
        self.prune_on_backup = prune;
        self
    }

    /// Capture every entry alive at `now` and append it as a new snapshot.
    ///
    /// Returns the number of entries captured.
    pub fn backup(&mut self, store: &mut EntityStore, now: Timestamp) -> usize {
        let keys = store.alive_copy(now);
        let entry_count = keys.values().map(KeyBucket::len).sum();
        let index = self.snapshots.len();

        self.snapshots.push(Snapshot {
            index,
            taken_at: now,
            entry_count,
            keys,
        });

        let pruned = if self.prune_on_backup {
            store.prune_expired(now)
        } else {
            0
        };

        debug!(index, entry_count, pruned, at = %now, "backup created");
        entry_count
    }

    /// Replace the live state with a copy of snapshot `index`.
    ///
    /// Expiries are copied verbatim and judged against `now` from here on,
    /// so anything that expired between the backup and `now` stays gone.
    /// Returns false, leaving the live state untouched, if there is no such
    /// snapshot.
    pub fn restore(&self, index: usize, store: &mut EntityStore, now: Timestamp) -> bool {
        let Some(snapshot) = self.snapshots.get(index) else {
            debug!(index, count = self.snapshots.len(), at = %now, "restore miss");
            return false;
        };

        store.replace(snapshot.to_live());
        debug!(
            index,
            taken_at = %snapshot.taken_at,
            at = %now,
            "restored snapshot"
        );
        true
    }

    /// Snapshot `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    /// Snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
