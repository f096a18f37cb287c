//! Group predicates and shift expressions.
//!
//! The condition identifying a group, and the position-range bounds layered
//! on top of it, form a small expression tree that stores interpret
//! structurally. Values are never interpolated into query text; nothing in
//! this module is executed as a string. [`Predicate`]'s `Display` output
//! exists for logs and tests.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::row::RowId;
use crate::value::Value;

/// Read access to one row, the seam through which predicates are evaluated.
///
/// Store row types implement this; [`Predicate::matches`] is written against
/// it so the evaluation rules live in one place regardless of how a store
/// lays its rows out.
pub trait RowView {
    /// The row's identity.
    fn row_id(&self) -> RowId;

    /// The value of the named column, `Value::Null` if the column is unset.
    fn value(&self, column: &str) -> Value;
}

/// Comparison operator for position-range clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// A condition identifying a set of rows within one table.
///
/// Scope conditions are built from `Eq`/`IsNull` clauses ANDed together;
/// the manager layers `Cmp` range bounds and a `NotId` self-exclusion on
/// top when computing a shift. Two rows belong to the same group iff their
/// scope predicates are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches every row. The scope condition of an unscoped list.
    All,
    /// `column = value`.
    Eq { column: String, value: Value },
    /// `column IS NULL`.
    IsNull { column: String },
    /// `id != excluded`. Excludes the row that triggered the operation.
    NotId { excluded: RowId },
    /// `column <op> bound`, evaluated against integer column values.
    Cmp {
        column: String,
        op: CmpOp,
        bound: i64,
    },
    /// Conjunction of all inner predicates.
    And(Vec<Predicate>),
}

impl Predicate {
    /// An equality clause, collapsing a NULL value to `IS NULL`.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        match value.into() {
            Value::Null => Predicate::IsNull { column },
            value => Predicate::Eq { column, value },
        }
    }

    /// A position-range clause on `column`.
    pub fn cmp(column: impl Into<String>, op: CmpOp, bound: i64) -> Self {
        Predicate::Cmp {
            column: column.into(),
            op,
            bound,
        }
    }

    /// Excludes the given row id.
    pub fn not_id(excluded: RowId) -> Self {
        Predicate::NotId { excluded }
    }

    /// Conjunction, flattening nested `And`s and dropping `All` terms.
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Predicate::All => {}
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::All,
            1 => flat.pop().expect("len checked"),
            _ => Predicate::And(flat),
        }
    }

    /// Evaluates the predicate against one row, with SQL comparison
    /// semantics: a NULL column value satisfies only `IsNull`.
    pub fn matches(&self, row: &dyn RowView) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq { column, value } => {
                let actual = row.value(column);
                !actual.is_null() && actual == *value
            }
            Predicate::IsNull { column } => row.value(column).is_null(),
            Predicate::NotId { excluded } => row.row_id() != *excluded,
            Predicate::Cmp { column, op, bound } => match row.value(column).as_integer() {
                Some(actual) => match op {
                    CmpOp::Lt => actual < *bound,
                    CmpOp::Le => actual <= *bound,
                    CmpOp::Gt => actual > *bound,
                    CmpOp::Ge => actual >= *bound,
                },
                None => false,
            },
            Predicate::And(parts) => parts.iter().all(|p| p.matches(row)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All => write!(f, "TRUE"),
            Predicate::Eq { column, value } => write!(f, "{column} = {value}"),
            Predicate::IsNull { column } => write!(f, "{column} IS NULL"),
            Predicate::NotId { excluded } => write!(f, "id != {excluded}"),
            Predicate::Cmp { column, op, bound } => {
                write!(f, "{column} {} {bound}", op.symbol())
            }
            Predicate::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

/// Direction of a bulk position shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftDirection {
    /// `position = position + 1`: opening a slot.
    Increment,
    /// `position = position - 1`: closing a gap.
    Decrement,
}

/// The column-delta expression applied by a bulk shift:
/// `position = position ± 1`, optionally alongside
/// `lock_version = lock_version + 1`.
///
/// Bumping the lock revision is what invalidates stale in-memory copies of
/// shifted rows; without it, concurrent reorders of the same group go
/// undetected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftUpdate {
    pub column: String,
    pub direction: ShiftDirection,
    pub bump_lock_version: bool,
}

impl ShiftUpdate {
    /// `column = column + 1` without a lock bump.
    pub fn increment(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: ShiftDirection::Increment,
            bump_lock_version: false,
        }
    }

    /// `column = column - 1` without a lock bump.
    pub fn decrement(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: ShiftDirection::Decrement,
            bump_lock_version: false,
        }
    }

    /// Also bump `lock_version` on every affected row.
    pub fn with_lock_bump(mut self, bump: bool) -> Self {
        self.bump_lock_version = bump;
        self
    }

    /// The signed delta this update applies.
    pub fn delta(&self) -> i64 {
        match self.direction {
            ShiftDirection::Increment => 1,
            ShiftDirection::Decrement => -1,
        }
    }
}
