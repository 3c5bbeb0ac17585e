//! Sequential operation dispatcher.

use super::operation::Operation;
use super::output::Output;
use crate::entities::EntityStore;
use crate::error::Result;
use crate::snapshots::SnapshotManager;
use crate::store::StoreConfig;
use crate::types::Timestamp;
use tracing::{trace, warn};

/// The store's notion of "now".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogicalClock {
    current: Timestamp,
}

impl LogicalClock {
    pub fn starting_at(t: Timestamp) -> Self {
        Self { current: t }
    }

    pub fn now(&self) -> Timestamp {
        self.current
    }

    /// Move to the time carried by an incoming operation.
    ///
    /// Callers promise non-decreasing times. A step backwards is logged and
    /// taken as given; the store does not reorder operations.
    pub fn advance_to(&mut self, t: Timestamp) {
        if t < self.current {
            warn!(from = %self.current, to = %t, "operation time moved backwards");
        }
        self.current = t;
    }

    /// Set the clock outright, as RESTORE does.
    pub fn set(&mut self, t: Timestamp) {
        self.current = t;
    }
}

/// Feeds operations, one at a time, to the entity store and the snapshot
/// manager.
///
/// Holds the clock and nothing else of its own. Each operation first moves
/// the clock to its timestamp and then runs to completion.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    clock: LogicalClock,
    entities: EntityStore,
    snapshots: SnapshotManager,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            clock: LogicalClock::starting_at(config.initial_time),
            entities: EntityStore::new(),
            snapshots: SnapshotManager::new().with_prune_on_backup(config.prune_on_backup),
        }
    }

    /// Apply one operation, returning its output if the operation has one.
    pub fn apply(&mut self, operation: Operation) -> Option<Output> {
        let at = operation.timestamp();
        trace!(op = %operation.tag(), at = %at, "dispatch");

        match operation {
            Operation::Restore { .. } => self.clock.set(at),
            _ => self.clock.advance_to(at),
        }
        let now = self.clock.now();

        match operation {
            Operation::Set {
                key, field, value, ..
            } => {
                self.entities.set(&key, &field, value);
                None
            }
            Operation::SetTtl {
                key,
                field,
                value,
                ttl,
                ..
            } => {
                self.entities.set_with_ttl(&key, &field, value, ttl, now);
                None
            }
            Operation::Get { key, field, .. } => Some(Output::Value(
                self.entities
                    .get(&key, &field, now)
                    .unwrap_or_default()
                    .to_string(),
            )),
            Operation::Delete { key, field, .. } => {
                Some(Output::Deleted(self.entities.delete(&key, &field, now)))
            }
            Operation::Fields { key, .. } => Some(Output::Fields(self.entities.fields(&key, now))),
            Operation::Backup { .. } => Some(Output::BackupCount(
                self.snapshots.backup(&mut self.entities, now),
            )),
            Operation::Restore { index, .. } => {
                let restored = match usize::try_from(index) {
                    Ok(index) => self.snapshots.restore(index, &mut self.entities, now),
                    Err(_) => false,
                };
                Some(Output::Restored(restored))
            }
        }
    }

    /// Decode and apply one tokenized record.
    pub fn apply_record<S: AsRef<str>>(&mut self, record: &[S]) -> Result<Option<Output>> {
        let operation = Operation::from_record(record)?;
        Ok(self.apply(operation))
    }

    /// Apply operations in order and collect the rendered outputs.
    pub fn run<I>(&mut self, operations: I) -> Vec<String>
    where
        I: IntoIterator<Item = Operation>,
    {
        operations
            .into_iter()
            .filter_map(|operation| self.apply(operation))
            .map(|output| output.to_string())
            .collect()
    }

    /// Decode and apply tokenized records in order, collecting rendered
    /// outputs.
    ///
    /// Stops at the first record that fails to decode. Records before it
    /// have already been applied.
    pub fn run_records<S, R>(&mut self, records: &[R]) -> Result<Vec<String>>
    where
        S: AsRef<str>,
        R: AsRef<[S]>,
    {
        let mut outputs = Vec::new();
        for record in records {
            if let Some(output) = self.apply_record(record.as_ref())? {
                outputs.push(output.to_string());
            }
        }
        Ok(outputs)
    }

    /// Current logical time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn snapshots(&self) -> &SnapshotManager {
        &self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    fn run(records: &[&[&str]]) -> Vec<String> {
        Dispatcher::new().run_records(records).unwrap()
    }

    #[test]
    fn test_clock_follows_operations() {
        let mut dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.now(), Timestamp(0));

        dispatcher.apply(Operation::Backup { at: Timestamp(7) });
        assert_eq!(dispatcher.now(), Timestamp(7));
    }

    #[test]
    fn test_clock_starts_at_configured_time() {
        let config = StoreConfig {
            initial_time: Timestamp(100),
            ..Default::default()
        };
        assert_eq!(Dispatcher::with_config(&config).now(), Timestamp(100));
    }

    #[test]
    fn test_clock_backwards_is_accepted() {
        let mut clock = LogicalClock::starting_at(Timestamp(10));
        clock.advance_to(Timestamp(4));
        assert_eq!(clock.now(), Timestamp(4));
    }

    #[test]
    fn test_expiry_scenario() {
        let out = run(&[
            &["SET_TTL", "10", "k", "a", "1", "5"],
            &["GET", "14", "k", "a"],
            &["GET", "15", "k", "a"],
            &["BACKUP", "16"],
        ]);
        assert_eq!(out, vec!["1", "", "0"]);
    }

    #[test]
    fn test_set_produces_no_output() {
        let out = run(&[
            &["SET", "1", "k", "a", "x"],
            &["SET_TTL", "1", "k", "b", "y", "3"],
        ]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_restore_expires_against_new_clock() {
        let out = run(&[
            &["SET", "1", "k", "a", "x"],
            &["SET_TTL", "2", "k", "b", "y", "2"],
            &["FIELDS", "3", "k"],
            &["BACKUP", "3"],
            &["FIELDS", "4", "k"],
            &["RESTORE", "10", "0"],
            &["FIELDS", "10", "k"],
        ]);
        assert_eq!(out, vec!["a=x,b=y", "2", "a=x", "true", "a=x"]);
    }

    #[test]
    fn test_zero_ttl_scenario() {
        let out = run(&[
            &["SET_TTL", "5", "k1", "a", "v", "0"],
            &["GET", "5", "k1", "a"],
            &["DELETE", "5", "k1", "a"],
            &["BACKUP", "5"],
            &["RESTORE", "6", "0"],
            &["FIELDS", "6", "k1"],
        ]);
        assert_eq!(out, vec!["", "false", "0", "true", ""]);
    }

    #[test]
    fn test_restore_invalid_indices() {
        let out = run(&[
            &["SET", "1", "k", "a", "x"],
            &["RESTORE", "2", "0"],
            &["BACKUP", "3"],
            &["RESTORE", "4", "1"],
            &["RESTORE", "4", "-1"],
            &["GET", "5", "k", "a"],
        ]);
        assert_eq!(out, vec!["false", "1", "false", "false", "x"]);
    }

    #[test]
    fn test_restore_sets_clock() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.apply(Operation::Backup { at: Timestamp(5) });
        let output = dispatcher.apply(Operation::Restore {
            at: Timestamp(9),
            index: 0,
        });

        assert_eq!(output, Some(Output::Restored(true)));
        assert_eq!(dispatcher.now(), Timestamp(9));
    }

    #[test]
    fn test_unknown_record_stops_batch() {
        let mut dispatcher = Dispatcher::new();
        let result = dispatcher.run_records(&[
            &["SET", "1", "k", "a", "x"][..],
            &["INCR", "2", "k", "a"][..],
            &["GET", "3", "k", "a"][..],
        ]);

        assert!(matches!(result, Err(StoreError::UnknownOperation(tag)) if tag == "INCR"));
        // The record before the failure was applied
        assert_eq!(dispatcher.entities().get("k", "a", Timestamp(1)), Some("x"));
    }

    #[test]
    fn test_run_typed_operations() {
        let mut dispatcher = Dispatcher::new();
        let out = dispatcher.run(vec![
            Operation::Set {
                at: Timestamp(1),
                key: "k".into(),
                field: "a".into(),
                value: "x".into(),
            },
            Operation::Delete {
                at: Timestamp(2),
                key: "k".into(),
                field: "a".into(),
            },
            Operation::Delete {
                at: Timestamp(3),
                key: "k".into(),
                field: "a".into(),
            },
        ]);
        assert_eq!(out, vec!["true", "false"]);
    }
}
