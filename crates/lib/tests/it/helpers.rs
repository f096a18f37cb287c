use std::sync::Arc;

use lineup::predicate::{Predicate, RowView};
use lineup::store::{InMemory, StoredRow};
use lineup::{
    ListConfig, PendingRow, PositionList, Result, RowChange, RowId, RowSnapshot, TableSchema,
    Value,
};

pub const SOURCE: &str = "mixins";

/// A configured list over an in-memory table, plus the host-lifecycle flows
/// the tests drive.
///
/// The crate deliberately leaves CRUD interception to the host, so the
/// fixture plays host: `create` runs the insert hook before the primary
/// write, `update`/`destroy` run the reconcile hooks after it, passing the
/// explicit before/after snapshots and the optimistic-lock revision the
/// loaded row was read with. Tests emulate a stale in-memory record simply
/// by keeping an old [`StoredRow`] around.
pub struct ListFixture {
    pub store: Arc<InMemory>,
    pub list: PositionList,
    position_column: String,
    scope_columns: Vec<String>,
    checks_lock: bool,
}

impl ListFixture {
    pub fn build(config: ListConfig, columns: &[&str]) -> Self {
        let mut schema = TableSchema::new(SOURCE)
            .with_column("id")
            .with_column("created_at");
        for column in columns {
            schema = schema.with_column(*column);
        }
        let store = Arc::new(InMemory::new());
        store.create_table(schema.clone());
        let list = PositionList::configure(config, &schema, store.clone())
            .expect("fixture configuration is valid");
        Self {
            position_column: list.position_column().to_string(),
            scope_columns: list.scope_columns().to_vec(),
            checks_lock: list.bumps_lock_version(),
            store,
            list,
        }
    }

    /// Unscoped list on the default `position` column.
    pub fn standard() -> Self {
        Self::build(ListConfig::new(), &["position", "parent_id"])
    }

    /// Unscoped list ordering a custom `pos` column.
    pub fn custom_column() -> Self {
        Self::build(
            ListConfig::new().with_position_column("pos"),
            &["pos", "parent_id"],
        )
    }

    /// Unscoped list on a table with optimistic locking enabled.
    pub fn with_lock_version() -> Self {
        Self::build(ListConfig::new(), &["position", "parent_id", "lock_version"])
    }

    /// List scoped by `parent_id` (configured as bare `parent`).
    pub fn scoped() -> Self {
        Self::build(
            ListConfig::new().with_scope("parent"),
            &["position", "parent_id"],
        )
    }

    /// List scoped by `parent_id` AND `user_id`.
    pub fn multi_scoped() -> Self {
        Self::build(
            ListConfig::new().with_scope("parent").with_scope("user"),
            &["position", "parent_id", "user_id"],
        )
    }

    // ==========================
    // HOST LIFECYCLE FLOWS
    // ==========================

    /// Creates a row: insert hook, then the durable insert.
    pub fn create(&self, values: &[(&str, Value)]) -> RowId {
        let mut pending = PendingRow::new(self.scope_values_in(values));
        self.list
            .on_before_insert(&mut pending)
            .expect("insert hook");
        let position = pending.position.expect("hook assigned a position");

        let mut insert_values: Vec<(String, Value)> = values
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect();
        insert_values.push((self.position_column.clone(), Value::Integer(position)));
        self.store.insert(SOURCE, insert_values).expect("insert")
    }

    /// Updates a row through a previously loaded handle: durable write
    /// (checked against the handle's lock revision), then the reconcile
    /// hook with before/after snapshots.
    pub fn update(&self, loaded: &StoredRow, changes: &[(&str, Value)]) -> Result<StoredRow> {
        let previous = self.snapshot_of(loaded);
        let written = self.store.update(
            SOURCE,
            loaded.id(),
            changes
                .iter()
                .map(|(column, value)| (column.to_string(), value.clone())),
            self.expected_lock(loaded),
        )?;
        let current = self.snapshot_of(&written);
        self.list
            .on_after_update(&RowChange::new(loaded.id(), previous, current))?;
        Ok(written)
    }

    /// Moves a row to a new position within its group.
    pub fn set_position(&self, loaded: &StoredRow, position: i64) -> Result<StoredRow> {
        let column = self.position_column.clone();
        self.update(loaded, &[(column.as_str(), Value::Integer(position))])
    }

    /// Removes a row through a previously loaded handle: durable delete
    /// (lock-checked), then the gap-closing hook.
    pub fn destroy(&self, loaded: &StoredRow) -> Result<()> {
        let removed = self
            .store
            .delete(SOURCE, loaded.id(), self.expected_lock(loaded))?;
        self.list
            .on_after_delete(removed.id(), &self.snapshot_of(&removed))
    }

    // ==========================
    // READS AND ASSERTION HELPERS
    // ==========================

    /// Fresh point read, like reloading a record.
    pub fn reload(&self, id: RowId) -> StoredRow {
        self.store.get(SOURCE, id).expect("row exists")
    }

    /// The single row holding `position` within the scope described by
    /// `scope` column/value pairs.
    pub fn row_at(&self, scope: &[(&str, Value)], position: i64) -> StoredRow {
        let mut parts: Vec<Predicate> = scope
            .iter()
            .map(|(column, value)| Predicate::eq(*column, value.clone()))
            .collect();
        parts.push(Predicate::eq(
            self.position_column.as_str(),
            Value::Integer(position),
        ));
        let predicate = Predicate::and(parts);
        let rows = self.store.select(SOURCE, &predicate, "id").expect("select");
        assert_eq!(rows.len(), 1, "expected exactly one row where {predicate}");
        rows.into_iter().next().expect("len checked")
    }

    /// All rows in the given scope, ordered by position.
    pub fn rows(&self, scope: &[(&str, Value)]) -> Vec<StoredRow> {
        let predicate = Predicate::and(
            scope
                .iter()
                .map(|(column, value)| Predicate::eq(*column, value.clone())),
        );
        self.store
            .select(SOURCE, &predicate, &self.position_column)
            .expect("select")
    }

    /// Position values in the given scope, ordered ascending.
    pub fn positions(&self, scope: &[(&str, Value)]) -> Vec<i64> {
        self.rows(scope)
            .iter()
            .map(|row| row.integer(&self.position_column).expect("positioned"))
            .collect()
    }

    /// Row ids in the given scope, ordered by position.
    pub fn ids_by_position(&self, scope: &[(&str, Value)]) -> Vec<i64> {
        self.rows(scope).iter().map(|row| row.id().0).collect()
    }

    /// Blanks the position of every row in the given scope with direct
    /// store writes, emulating an external data load that bypassed the
    /// lifecycle hooks.
    pub fn null_out_positions(&self, scope: &[(&str, Value)]) {
        for row in self.rows(scope) {
            self.store
                .update(
                    SOURCE,
                    row.id(),
                    [(self.position_column.clone(), Value::Null)],
                    None,
                )
                .expect("blank position");
        }
    }

    fn expected_lock(&self, loaded: &StoredRow) -> Option<i64> {
        self.checks_lock.then(|| loaded.lock_version())
    }

    /// The hook-facing scope vector (one value per configured scope
    /// column, `Null` when the insert does not set the column).
    fn scope_values_in(&self, values: &[(&str, Value)]) -> Vec<Value> {
        self.scope_columns
            .iter()
            .map(|column| {
                values
                    .iter()
                    .find(|(candidate, _)| candidate == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or(Value::Null)
            })
            .collect()
    }

    /// The hook-facing snapshot of a stored row.
    pub fn snapshot_of(&self, row: &StoredRow) -> RowSnapshot {
        let scope = self
            .scope_columns
            .iter()
            .map(|column| row.value(column))
            .collect();
        RowSnapshot::new(scope, row.integer(&self.position_column))
    }
}
