//! Entity store implementation.

use crate::types::{Entry, FieldValue, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// All entries stored under one key, ordered by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBucket {
    fields: BTreeMap<String, Entry>,
}

impl KeyBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `field`, alive or not.
    pub fn entry(&self, field: &str) -> Option<&Entry> {
        self.fields.get(field)
    }

    /// Entry for `field` if it is alive at `now`.
    pub fn alive_entry(&self, field: &str, now: Timestamp) -> Option<&Entry> {
        self.fields.get(field).filter(|entry| entry.is_alive(now))
    }

    pub fn insert(&mut self, field: impl Into<String>, entry: Entry) {
        self.fields.insert(field.into(), entry);
    }

    pub fn remove(&mut self, field: &str) -> Option<Entry> {
        self.fields.remove(field)
    }

    /// Alive entries in field order.
    pub fn iter_alive(&self, now: Timestamp) -> impl Iterator<Item = (&str, &Entry)> + '_ {
        self.fields
            .iter()
            .filter(move |(_, entry)| entry.is_alive(now))
            .map(|(field, entry)| (field.as_str(), entry))
    }

    /// All stored entries in field order, expired ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> + '_ {
        self.fields.iter().map(|(field, entry)| (field.as_str(), entry))
    }

    pub fn alive_len(&self, now: Timestamp) -> usize {
        self.iter_alive(now).count()
    }

    /// Physical entry count, expired ones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Independent copy holding only entries alive at `now`.
    ///
    /// Returns None when nothing is alive.
    pub fn alive_copy(&self, now: Timestamp) -> Option<KeyBucket> {
        let fields: BTreeMap<String, Entry> = self
            .fields
            .iter()
            .filter(|(_, entry)| entry.is_alive(now))
            .map(|(field, entry)| (field.clone(), entry.clone()))
            .collect();

        if fields.is_empty() {
            None
        } else {
            Some(KeyBucket { fields })
        }
    }

    /// Drop entries expired at `now`, returning how many were removed.
    fn retain_alive(&mut self, now: Timestamp) -> usize {
        let before = self.fields.len();
        self.fields.retain(|_, entry| entry.is_alive(now));
        before - self.fields.len()
    }
}

/// Owns the live key -> field -> entry mapping.
///
/// Every method that reads takes the current logical time; the store keeps
/// no clock of its own.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    keys: HashMap<String, KeyBucket>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key.field = value` with no expiry.
    ///
    /// Any TTL previously attached to the field is cancelled.
    pub fn set(&mut self, key: &str, field: &str, value: impl Into<String>) {
        self.bucket_mut(key).insert(field, Entry::persistent(value));
    }

    /// Set `key.field = value`, expiring `ttl` ticks after `now`.
    ///
    /// A zero TTL yields an entry that is already expired at `now`.
    pub fn set_with_ttl(
        &mut self,
        key: &str,
        field: &str,
        value: impl Into<String>,
        ttl: u64,
        now: Timestamp,
    ) {
        self.bucket_mut(key)
            .insert(field, Entry::expiring(value, now.after(ttl)));
    }

    /// Value of `key.field` if alive at `now`.
    pub fn get(&self, key: &str, field: &str, now: Timestamp) -> Option<&str> {
        self.keys
            .get(key)
            .and_then(|bucket| bucket.alive_entry(field, now))
            .map(Entry::value)
    }

    /// Remove `key.field` if it is alive at `now`.
    ///
    /// Returns false for a missing field and for an expired one; an expired
    /// entry is left where it is.
    pub fn delete(&mut self, key: &str, field: &str, now: Timestamp) -> bool {
        let Some(bucket) = self.keys.get_mut(key) else {
            return false;
        };

        if bucket.alive_entry(field, now).is_none() {
            return false;
        }

        bucket.remove(field);
        if bucket.is_empty() {
            self.keys.remove(key);
        }
        true
    }

    /// Alive fields of `key` at `now`, sorted by field name.
    pub fn fields(&self, key: &str, now: Timestamp) -> Vec<FieldValue> {
        self.keys
            .get(key)
            .map(|bucket| {
                bucket
                    .iter_alive(now)
                    .map(|(field, entry)| FieldValue {
                        field: field.to_string(),
                        value: entry.value().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of `(key, field)` pairs alive at `now`.
    pub fn alive_count(&self, now: Timestamp) -> usize {
        self.keys.values().map(|bucket| bucket.alive_len(now)).sum()
    }

    /// Deep copy of every entry alive at `now`.
    ///
    /// Keys with no alive entries are left out.
    pub fn alive_copy(&self, now: Timestamp) -> HashMap<String, KeyBucket> {
        self.keys
            .iter()
            .filter_map(|(key, bucket)| bucket.alive_copy(now).map(|copy| (key.clone(), copy)))
            .collect()
    }

    /// Replace the whole live state.
    pub fn replace(&mut self, keys: HashMap<String, KeyBucket>) {
        self.keys = keys;
    }

    /// Physically remove entries expired at `now` and any key left empty.
    ///
    /// Returns the number of entries removed. Reads at times `>= now` are
    /// unaffected; reads at earlier times lose the removed entries.
    pub fn prune_expired(&mut self, now: Timestamp) -> usize {
        let mut removed = 0;
        self.keys.retain(|_, bucket| {
            removed += bucket.retain_alive(now);
            !bucket.is_empty()
        });
        removed
    }

    /// Bucket for `key`, if present.
    pub fn bucket(&self, key: &str) -> Option<&KeyBucket> {
        self.keys.get(key)
    }

    /// Keys physically present, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.keys.keys().map(String::as_str)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Entries physically stored, expired ones included.
    pub fn stored_entries(&self) -> usize {
        self.keys.values().map(KeyBucket::len).sum()
    }

    fn bucket_mut(&mut self, key: &str) -> &mut KeyBucket {
        self.keys.entry(key.to_string()).or_default()
    }
}
