//! Live key -> field -> entry state.
//!
//! Expiry is a predicate evaluated against the caller's clock at every
//! access. Nothing runs in the background; expired entries linger until a
//! mutation or a prune reclaims them, and every read treats them as absent.

mod store;

pub use store::{EntityStore, KeyBucket};
