//! Typed operations and decoding from tokenized records.

use crate::error::{Result, StoreError};
use crate::types::Timestamp;
use std::fmt;
use std::str::FromStr;

/// Operation tag as it appears in the first token of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpTag {
    Set,
    SetTtl,
    Get,
    Delete,
    Fields,
    Backup,
    Restore,
}

impl OpTag {
    pub fn as_str(self) -> &'static str {
        match self {
            OpTag::Set => "SET",
            OpTag::SetTtl => "SET_TTL",
            OpTag::Get => "GET",
            OpTag::Delete => "DELETE",
            OpTag::Fields => "FIELDS",
            OpTag::Backup => "BACKUP",
            OpTag::Restore => "RESTORE",
        }
    }

    /// Number of tokens in a record with this tag, the tag included.
    pub fn arity(self) -> usize {
        match self {
            OpTag::Backup => 2,
            OpTag::Fields | OpTag::Restore => 3,
            OpTag::Get | OpTag::Delete => 4,
            OpTag::Set => 5,
            OpTag::SetTtl => 6,
        }
    }

    /// Whether operations with this tag emit an output.
    pub fn produces_output(self) -> bool {
        !matches!(self, OpTag::Set | OpTag::SetTtl)
    }
}

impl FromStr for OpTag {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SET" => Ok(OpTag::Set),
            "SET_TTL" => Ok(OpTag::SetTtl),
            "GET" => Ok(OpTag::Get),
            "DELETE" => Ok(OpTag::Delete),
            "FIELDS" => Ok(OpTag::Fields),
            "BACKUP" => Ok(OpTag::Backup),
            "RESTORE" => Ok(OpTag::Restore),
            other => Err(StoreError::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for OpTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed operation. Every variant carries the logical time it runs at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Set {
        at: Timestamp,
        key: String,
        field: String,
        value: String,
    },
    SetTtl {
        at: Timestamp,
        key: String,
        field: String,
        value: String,
        ttl: u64,
    },
    Get {
        at: Timestamp,
        key: String,
        field: String,
    },
    Delete {
        at: Timestamp,
        key: String,
        field: String,
    },
    Fields {
        at: Timestamp,
        key: String,
    },
    Backup {
        at: Timestamp,
    },
    /// `index` is signed so that a negative index from a record reaches the
    /// store and reports `"false"` like any other missing backup.
    Restore {
        at: Timestamp,
        index: i64,
    },
}

impl Operation {
    pub fn tag(&self) -> OpTag {
        match self {
            Operation::Set { .. } => OpTag::Set,
            Operation::SetTtl { .. } => OpTag::SetTtl,
            Operation::Get { .. } => OpTag::Get,
            Operation::Delete { .. } => OpTag::Delete,
            Operation::Fields { .. } => OpTag::Fields,
            Operation::Backup { .. } => OpTag::Backup,
            Operation::Restore { .. } => OpTag::Restore,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Operation::Set { at, .. }
            | Operation::SetTtl { at, .. }
            | Operation::Get { at, .. }
            | Operation::Delete { at, .. }
            | Operation::Fields { at, .. }
            | Operation::Backup { at }
            | Operation::Restore { at, .. } => *at,
        }
    }

    /// Decode a tokenized record such as `["SET_TTL", "10", "k", "a", "1", "5"]`.
    pub fn from_record<S: AsRef<str>>(record: &[S]) -> Result<Self> {
        let tokens: Vec<&str> = record.iter().map(AsRef::as_ref).collect();
        let tag: OpTag = tokens.first().copied().unwrap_or_default().parse()?;

        if tokens.len() != tag.arity() {
            return Err(StoreError::MalformedRecord {
                tag: tag.to_string(),
                expected: tag.arity(),
                got: tokens.len(),
            });
        }

        let at = Timestamp(parse_int(tag, "time", tokens[1])?);
        let owned = |i: usize| tokens[i].to_string();

        let operation = match tag {
            OpTag::Set => Operation::Set {
                at,
                key: owned(2),
                field: owned(3),
                value: owned(4),
            },
            OpTag::SetTtl => Operation::SetTtl {
                at,
                key: owned(2),
                field: owned(3),
                value: owned(4),
                ttl: parse_int(tag, "ttl", tokens[5])?,
            },
            OpTag::Get => Operation::Get {
                at,
                key: owned(2),
                field: owned(3),
            },
            OpTag::Delete => Operation::Delete {
                at,
                key: owned(2),
                field: owned(3),
            },
            OpTag::Fields => Operation::Fields { at, key: owned(2) },
            OpTag::Backup => Operation::Backup { at },
            OpTag::Restore => Operation::Restore {
                at,
                index: parse_int(tag, "backup index", tokens[2])?,
            },
        };

        Ok(operation)
    }
}

fn parse_int<T: FromStr>(tag: OpTag, name: &'static str, token: &str) -> Result<T> {
    token.parse().map_err(|_| StoreError::InvalidInteger {
        tag: tag.to_string(),
        name,
        value: token.to_string(),
    })
}
