//! Scalar column values.
//!
//! A [`Value`] is what a scope or ordering column can hold: an integer key,
//! a text key, a creation timestamp, or SQL NULL. Scope columns partition
//! rows into groups by these values, so `Value` carries equality, hashing,
//! and a total order (used by stores to sort rows by an arbitrary column).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value.
///
/// The total `Ord` implementation compares across variants by variant rank
/// (`Null < Integer < Text < Timestamp`). That is a sorting convenience for
/// stores, not SQL comparison semantics; predicate evaluation in
/// [`Predicate::matches`](crate::predicate::Predicate::matches) treats NULL
/// the way SQL does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// An integer key, e.g. a foreign key id or a position.
    Integer(i64),
    /// A text key, e.g. a name column used as a scope.
    Text(String),
    /// A point in time, e.g. `created_at`.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The integer payload, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way it would appear in a SQL literal:
    /// `NULL`, `7`, `'Brandy'`, or an RFC3339 timestamp.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Timestamp(t) => write!(f, "'{}'", t.to_rfc3339()),
        }
    }
}
