//! Point-in-time backups of the live state.
//!
//! A snapshot owns a deep copy of the entries alive when it was taken and
//! never changes afterwards. Restoring copies it back out, so neither side
//! can observe the other's later mutations.

mod manager;

pub use manager::{Snapshot, SnapshotManager};
