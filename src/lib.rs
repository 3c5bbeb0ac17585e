//! # Field Store
//!
//! An in-memory key -> field -> value store with per-field expiry and
//! point-in-time backups, driven by a caller-supplied logical clock.
//!
//! ## Core Concepts
//!
//! - **Entries**: string values with an optional absolute expiry time
//! - **Lazy expiry**: an entry is alive iff it has no expiry or `now < expiry`,
//!   checked at every access; there is no background sweeper
//! - **Snapshots**: deep copies of the entries alive at BACKUP time, kept in
//!   creation order and never mutated
//! - **Restore**: wholesale replacement of the live state by a fresh copy of
//!   a snapshot, with expiries re-evaluated against the restore time
//!
//! ## Example
//!
//! ```
//! use fieldstore::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::default());
//! let out = store.run_records(&[
//!     &["SET_TTL", "10", "k", "a", "1", "5"][..],
//!     &["GET", "14", "k", "a"][..],
//!     &["GET", "15", "k", "a"][..],
//!     &["BACKUP", "16"][..],
//! ])?;
//! assert_eq!(out, vec!["1", "", "0"]);
//! # Ok::<(), fieldstore::StoreError>(())
//! ```

pub mod dispatch;
pub mod entities;
pub mod error;
pub mod snapshots;
pub mod store;
pub mod types;

// Re-exports
pub use dispatch::{Dispatcher, LogicalClock, OpTag, Operation, Output};
pub use entities::{EntityStore, KeyBucket};
pub use error::{Result, StoreError};
pub use snapshots::{Snapshot, SnapshotManager};
pub use store::{Store, StoreConfig};
pub use types::*;
