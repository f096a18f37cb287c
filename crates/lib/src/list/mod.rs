//! Dense position maintenance for grouped rows.
//!
//! [`PositionList`] keeps an integer ordering column a contiguous 1..N
//! sequence within each group of rows, where a group is the set of rows
//! sharing the same scope-column values. The host record lifecycle calls
//! into it before a row is first persisted, after a row's attributes were
//! updated, and after a row was removed; the list issues the scoped reads
//! and bulk shifts that keep every other row's position consistent.
//!
//! The list itself takes no locks and performs no retries. When the backing
//! table carries a `lock_version` column, every shift bumps the revision of
//! the rows it touches, so a concurrent writer holding a pre-shift snapshot
//! fails with a stale-write conflict instead of corrupting the order.

use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::config::{ListConfig, TableSchema};
use crate::constants::{CREATED_AT_COLUMN, LOCK_VERSION_COLUMN};
use crate::predicate::{CmpOp, Predicate, ShiftDirection, ShiftUpdate};
use crate::row::{PendingRow, RowChange, RowId, RowSnapshot};
use crate::store::RecordStore;
use crate::value::Value;

mod errors;
pub use errors::ListError;


/// One configured dense ordering over one table.
///
/// Construction resolves the [`ListConfig`] against the table's schema:
/// the position column must exist, each scope attribute is resolved to a
/// real column (bare name first, then with an `_id` suffix), and the
/// presence of a `lock_version` column decides whether shifts bump
/// optimistic-lock revisions. Invalid configuration fails here, not at the
/// first operation.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use lineup::store::InMemory;
/// use lineup::{ListConfig, PendingRow, PositionList, TableSchema, Value};
///
/// # fn main() -> lineup::Result<()> {
/// let schema = TableSchema::new("items")
///     .with_column("id")
///     .with_column("position")
///     .with_column("parent_id")
///     .with_column("created_at");
/// let store = Arc::new(InMemory::new());
/// store.create_table(schema.clone());
///
/// let config = ListConfig::new().with_scope("parent");
/// let list = PositionList::configure(config, &schema, store.clone())?;
///
/// let mut row = PendingRow::new(vec![Value::Integer(1)]);
/// list.on_before_insert(&mut row)?;
/// assert_eq!(row.position, Some(1));
/// # Ok(())
/// # }
/// ```
pub struct PositionList {
    store: Arc<dyn RecordStore>,
    source: String,
    position_column: String,
    scope_columns: Vec<String>,
    bump_lock_version: bool,
}

impl std::fmt::Debug for PositionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionList")
            .field("source", &self.source)
            .field("position_column", &self.position_column)
            .field("scope_columns", &self.scope_columns)
            .field("bump_lock_version", &self.bump_lock_version)
            .finish_non_exhaustive()
    }
}

impl PositionList {
    /// Resolves `config` against `schema` and binds the list to a store.
    ///
    /// # Errors
    /// Returns a [`ListError`] configuration variant when the position
    /// column or a scope attribute names no existing column.
    pub fn configure(
        config: ListConfig,
        schema: &TableSchema,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self> {
        if !schema.has_column(config.position_column()) {
            return Err(ListError::UnknownPositionColumn {
                table: schema.name().to_string(),
                column: config.position_column().to_string(),
            }
            .into());
        }

        let mut scope_columns = Vec::with_capacity(config.scope().len());
        for attribute in config.scope() {
            scope_columns.push(Self::resolve_scope_column(schema, attribute)?);
        }

        Ok(Self {
            store,
            source: schema.name().to_string(),
            position_column: config.position_column().to_string(),
            scope_columns,
            bump_lock_version: schema.has_column(LOCK_VERSION_COLUMN),
        })
    }

    /// A scope attribute given without its `_id` suffix refers to the
    /// suffixed column, unless the bare name is itself a column.
    fn resolve_scope_column(schema: &TableSchema, attribute: &str) -> Result<String> {
        if schema.has_column(attribute) {
            return Ok(attribute.to_string());
        }
        let suffixed = format!("{attribute}_id");
        if schema.has_column(&suffixed) {
            return Ok(suffixed);
        }
        Err(ListError::UnknownScopeColumn {
            table: schema.name().to_string(),
            attribute: attribute.to_string(),
            suffixed,
        }
        .into())
    }

    /// The table this list orders.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The ordering column.
    pub fn position_column(&self) -> &str {
        &self.position_column
    }

    /// The resolved scope columns, in configuration order.
    pub fn scope_columns(&self) -> &[String] {
        &self.scope_columns
    }

    /// Whether shifts bump the `lock_version` of the rows they touch.
    pub fn bumps_lock_version(&self) -> bool {
        self.bump_lock_version
    }

    /// The predicate identifying the group of a row with the given scope
    /// values: one equality (or IS-NULL) clause per scope column, ANDed.
    ///
    /// Two rows belong to the same group iff their conditions are equal.
    /// For an unscoped list this is [`Predicate::All`].
    ///
    /// # Errors
    /// [`ListError::ScopeArityMismatch`] when `scope_values` does not
    /// supply exactly one value per configured scope column.
    pub fn scope_condition(&self, scope_values: &[Value]) -> Result<Predicate> {
        if scope_values.len() != self.scope_columns.len() {
            return Err(ListError::ScopeArityMismatch {
                expected: self.scope_columns.len(),
                actual: scope_values.len(),
            }
            .into());
        }
        Ok(Predicate::and(
            self.scope_columns
                .iter()
                .zip(scope_values)
                .map(|(column, value)| Predicate::eq(column.clone(), value.clone())),
        ))
    }

    /// Assigns the position of a row about to be inserted: one past the
    /// group's current maximum, or 1 for an empty group.
    ///
    /// Must run before the insert is made durable. Any position the caller
    /// put on the pending row is overwritten: new rows always append, and
    /// a specific rank is reached by updating the row afterwards.
    ///
    /// If the group has members but no position data at all (e.g. after an
    /// external data load), the group is first re-sequenced by creation
    /// order and the new row appended after it.
    pub fn on_before_insert(&self, row: &mut PendingRow) -> Result<()> {
        let scope = self.scope_condition(&row.scope)?;
        let next = match self
            .store
            .max_position(&self.source, &scope, &self.position_column)?
        {
            Some(max) => max + 1,
            None => {
                let members =
                    self.store
                        .find_ordered_ids(&self.source, &scope, CREATED_AT_COLUMN)?;
                if members.is_empty() {
                    1
                } else {
                    debug!(
                        "group ({scope}) in {} has {} members but no positions, re-sequencing",
                        self.source,
                        members.len()
                    );
                    self.apply_order(&members)?;
                    members.len() as i64 + 1
                }
            }
        };
        row.position = Some(next);
        Ok(())
    }

    /// Reconciles the group orderings after a row's attributes were
    /// durably updated.
    ///
    /// `change` carries the scope values and position both as of the start
    /// of the operation and as written. The shifted row set never includes
    /// the updated row itself; it already holds its final position from the
    /// write that triggered this hook.
    ///
    /// * Scope and position unchanged: no-op.
    /// * Moved within its group: the displaced block between the old and
    ///   new position shifts by one toward the vacated slot.
    /// * Moved to another group: the old group closes the gap left behind,
    ///   the new group opens a slot at the target position. The two shifts
    ///   touch disjoint rows, so their order is irrelevant.
    /// * Previous position unset: the order was never initialized, so the
    ///   current group is rebuilt 1..N by creation order instead.
    pub fn on_after_update(&self, change: &RowChange) -> Result<()> {
        let current_scope = self.scope_condition(&change.current.scope)?;
        let Some(previous_position) = change.previous.position else {
            return self.resequence_group(&current_scope);
        };
        let previous_scope = self.scope_condition(&change.previous.scope)?;
        let scope_changed = current_scope != previous_scope;

        let Some(current_position) = change.current.position else {
            // The write cleared the position. Close the old gap if the row
            // also left its group, then rebuild the group it is in now.
            if scope_changed {
                self.shift(
                    Predicate::and([
                        previous_scope,
                        Predicate::cmp(&self.position_column, CmpOp::Gt, previous_position),
                        Predicate::not_id(change.id),
                    ]),
                    ShiftDirection::Decrement,
                )?;
            }
            return self.resequence_group(&current_scope);
        };

        if scope_changed {
            debug!(
                "{}#{} moved groups: ({previous_scope}) -> ({current_scope})",
                self.source, change.id
            );
            self.shift(
                Predicate::and([
                    previous_scope,
                    Predicate::cmp(&self.position_column, CmpOp::Gt, previous_position),
                    Predicate::not_id(change.id),
                ]),
                ShiftDirection::Decrement,
            )?;
            self.shift(
                Predicate::and([
                    current_scope,
                    Predicate::cmp(&self.position_column, CmpOp::Ge, current_position),
                    Predicate::not_id(change.id),
                ]),
                ShiftDirection::Increment,
            )?;
        } else if current_position < previous_position {
            self.shift(
                Predicate::and([
                    current_scope,
                    Predicate::cmp(&self.position_column, CmpOp::Ge, current_position),
                    Predicate::cmp(&self.position_column, CmpOp::Lt, previous_position),
                    Predicate::not_id(change.id),
                ]),
                ShiftDirection::Increment,
            )?;
        } else if current_position > previous_position {
            self.shift(
                Predicate::and([
                    current_scope,
                    Predicate::cmp(&self.position_column, CmpOp::Gt, previous_position),
                    Predicate::cmp(&self.position_column, CmpOp::Le, current_position),
                    Predicate::not_id(change.id),
                ]),
                ShiftDirection::Decrement,
            )?;
        }
        Ok(())
    }

    /// Closes the gap left by a row that was durably removed.
    ///
    /// `last` is the removed row's last-known scope and position. Every
    /// remaining group member past that position moves down by one. A row
    /// that never held a position leaves no gap to close.
    pub fn on_after_delete(&self, id: RowId, last: &RowSnapshot) -> Result<()> {
        let scope = self.scope_condition(&last.scope)?;
        let Some(position) = last.position else {
            return Ok(());
        };
        debug!(
            "closing gap left by {}#{id} at position {position}",
            self.source
        );
        self.shift(
            Predicate::and([
                scope,
                Predicate::cmp(&self.position_column, CmpOp::Gt, position),
            ]),
            ShiftDirection::Decrement,
        )?;
        Ok(())
    }

    /// Reassigns positions 1..N to the group with the given scope values,
    /// ordered by creation time.
    ///
    /// This is the repair path for missing or corrupt position data. It
    /// writes each row's position directly, bypassing shift logic, and is
    /// not part of steady-state operation.
    pub fn resequence(&self, scope_values: &[Value]) -> Result<()> {
        let scope = self.scope_condition(scope_values)?;
        self.resequence_group(&scope)
    }

    fn resequence_group(&self, scope: &Predicate) -> Result<()> {
        let members = self
            .store
            .find_ordered_ids(&self.source, scope, CREATED_AT_COLUMN)?;
        self.apply_order(&members)
    }

    fn apply_order(&self, members: &[RowId]) -> Result<()> {
        debug!(
            "re-sequencing {} rows in {} by creation order",
            members.len(),
            self.source
        );
        for (index, id) in members.iter().enumerate() {
            self.store
                .write_position(&self.source, *id, &self.position_column, index as i64 + 1)?;
        }
        Ok(())
    }

    fn shift(&self, predicate: Predicate, direction: ShiftDirection) -> Result<u64> {
        let update = match direction {
            ShiftDirection::Increment => ShiftUpdate::increment(&self.position_column),
            ShiftDirection::Decrement => ShiftUpdate::decrement(&self.position_column),
        }
        .with_lock_bump(self.bump_lock_version);
        let affected = self.store.bulk_shift(&self.source, &predicate, &update)?;
        debug!("shifted {affected} rows in {} where {predicate}", self.source);
        Ok(affected)
    }
}
