//! Core types for the field store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical time, in whole ticks.
///
/// Supplied by the caller with every operation; the store never reads a
/// wall clock.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The time `ttl` ticks after this one, clamped at the end of time.
    pub fn after(self, ttl: u64) -> Self {
        let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_add(ttl))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored value with an optional absolute expiry.
///
/// `expiry` is an absolute timestamp rather than a remaining duration, so
/// an entry copied into a snapshot and restored later is judged against
/// whatever the clock reads at that point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    value: String,
    expiry: Option<Timestamp>,
}

impl Entry {
    /// An entry that never expires.
    pub fn persistent(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expiry: None,
        }
    }

    /// An entry that expires at `expiry`.
    pub fn expiring(value: impl Into<String>, expiry: Timestamp) -> Self {
        Self {
            value: value.into(),
            expiry: Some(expiry),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expiry(&self) -> Option<Timestamp> {
        self.expiry
    }

    /// Alive iff there is no expiry or `now` is strictly before it.
    pub fn is_alive(&self, now: Timestamp) -> bool {
        match self.expiry {
            None => true,
            Some(expiry) => now < expiry,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        !self.is_alive(now)
    }
}

/// One `field=value` pair as reported by FIELDS.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldValue {
    pub field: String,
    pub value: String,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Store statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub current_time: Timestamp,
    /// Keys physically present in live state.
    pub key_count: u64,
    /// Entries physically present, including expired ones not yet reclaimed.
    pub stored_entries: u64,
    /// Entries alive at `current_time`.
    pub alive_entries: u64,
    pub snapshot_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistent_entry_never_expires() {
        let entry = Entry::persistent("v");
        assert!(entry.is_alive(Timestamp(0)));
        assert!(entry.is_alive(Timestamp(i64::MAX)));
        assert_eq!(entry.expiry(), None);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let entry = Entry::expiring("v", Timestamp(15));
        assert!(entry.is_alive(Timestamp(14)));
        assert!(entry.is_expired(Timestamp(15)));
        assert!(entry.is_expired(Timestamp(16)));
    }

    #[test]
    fn test_timestamp_after() {
        assert_eq!(Timestamp(10).after(5), Timestamp(15));
        assert_eq!(Timestamp(10).after(0), Timestamp(10));
        assert_eq!(Timestamp(10).after(u64::MAX), Timestamp(i64::MAX));
    }

    #[test]
    fn test_field_value_display() {
        let pair = FieldValue {
            field: "a".into(),
            value: "1".into(),
        };
        assert_eq!(pair.to_string(), "a=1");
    }
}
