//! Operation results.

use crate::types::FieldValue;
use std::fmt;

/// Result of an operation that reports something.
///
/// `Display` renders the textual form: the value or `""` for GET,
/// `"true"`/`"false"` for DELETE and RESTORE, comma-joined `field=value`
/// pairs for FIELDS and the decimal count for BACKUP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// GET; empty when the field is missing or expired.
    Value(String),
    Deleted(bool),
    Fields(Vec<FieldValue>),
    BackupCount(usize),
    Restored(bool),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Value(value) => f.write_str(value),
            Output::Deleted(flag) | Output::Restored(flag) => write!(f, "{flag}"),
            Output::BackupCount(count) => write!(f, "{count}"),
            Output::Fields(pairs) => {
                for (i, pair) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{pair}")?;
                }
                Ok(())
            }
        }
    }
}
