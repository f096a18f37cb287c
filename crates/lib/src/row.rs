//! Row identities and lifecycle snapshots.
//!
//! The manager never inspects live records through reflection; the host hands
//! it explicit snapshots of the scope values and position involved in the
//! operation. [`RowSnapshot`] captures one instant, [`RowChange`] captures
//! both sides of a committed update, and [`PendingRow`] is a row about to be
//! inserted whose position the insert hook fills in.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

/// Identity of a row in the backing table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RowId(pub i64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RowId {
    fn from(id: i64) -> Self {
        RowId(id)
    }
}

/// Scope values and position of one row at one instant.
///
/// `scope` holds one [`Value`] per configured scope column, in declaration
/// order. `position` is `None` for rows whose order was never initialized
/// (e.g. after an external data load).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSnapshot {
    pub scope: Vec<Value>,
    pub position: Option<i64>,
}

impl RowSnapshot {
    pub fn new(scope: Vec<Value>, position: Option<i64>) -> Self {
        Self { scope, position }
    }
}

/// Both sides of a committed update: the attribute values as of the start of
/// the operation and the values that were just written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChange {
    /// The updated row.
    pub id: RowId,
    /// Scope and position before the write.
    pub previous: RowSnapshot,
    /// Scope and position as written.
    pub current: RowSnapshot,
}

impl RowChange {
    pub fn new(id: RowId, previous: RowSnapshot, current: RowSnapshot) -> Self {
        Self {
            id,
            previous,
            current,
        }
    }
}

/// A row about to be inserted.
///
/// The host constructs one with the scope values it is going to write;
/// [`PositionList::on_before_insert`](crate::list::PositionList::on_before_insert)
/// assigns `position` before the insert is made durable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRow {
    pub scope: Vec<Value>,
    pub position: Option<i64>,
}

impl PendingRow {
    /// A pending row with the given scope values and no position yet.
    pub fn new(scope: Vec<Value>) -> Self {
        Self {
            scope,
            position: None,
        }
    }
}
