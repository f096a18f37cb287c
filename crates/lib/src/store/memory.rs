//! In-memory record store.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::RwLock;
use tracing::trace;

use crate::config::TableSchema;
use crate::constants::{CREATED_AT_COLUMN, ID_COLUMN, LOCK_VERSION_COLUMN};
use crate::predicate::{Predicate, RowView, ShiftUpdate};
use crate::row::RowId;
use crate::store::{RecordStore, StoreError};
use crate::value::Value;
use crate::{Error, Result};

/// One materialized row: its id, column values, and optimistic-lock
/// revision.
///
/// The revision is tracked for every row; whether anything *checks* it is up
/// to the caller. The host passes its loaded revision to [`InMemory::update`]
/// and [`InMemory::delete`] when the table declares a `lock_version` column,
/// mirroring how relational hosts enable optimistic locking by adding that
/// column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRow {
    id: RowId,
    values: BTreeMap<String, Value>,
    lock_version: i64,
}

impl StoredRow {
    /// The row's identity.
    pub fn id(&self) -> RowId {
        self.id
    }

    /// The row's current optimistic-lock revision.
    pub fn lock_version(&self) -> i64 {
        self.lock_version
    }

    /// The integer payload of the named column, if set.
    pub fn integer(&self, column: &str) -> Option<i64> {
        self.value(column).as_integer()
    }
}

impl RowView for StoredRow {
    fn row_id(&self) -> RowId {
        self.id
    }

    fn value(&self, column: &str) -> Value {
        if column == ID_COLUMN {
            return Value::Integer(self.id.0);
        }
        if column == LOCK_VERSION_COLUMN {
            return Value::Integer(self.lock_version);
        }
        self.values.get(column).cloned().unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
struct TableData {
    schema: TableSchema,
    next_id: i64,
    rows: BTreeMap<RowId, StoredRow>,
}

impl TableData {
    fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// A simple in-memory record store backed by `RwLock`-protected tables.
///
/// Suitable for testing, development, or host emulation; it implements the
/// full [`RecordStore`] contract the position manager consumes plus the
/// primary-write surface a host lifecycle drives (insert, point read,
/// optimistic update, optimistic delete, ordered select).
///
/// It provides basic persistence via [`save_to_file`](InMemory::save_to_file)
/// and [`load_from_file`](InMemory::load_from_file), serializing the tables
/// to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    /// Tables keyed by source name, with a read-write lock for concurrent
    /// access
    tables: RwLock<HashMap<String, TableData>>,
}

/// Serializable form of one table: rows flattened to a list, keyed back by
/// id on load
#[derive(Serialize, Deserialize)]
struct SerializableTable {
    schema: TableSchema,
    next_id: i64,
    rows: Vec<StoredRow>,
}

/// Serializable form of the store for persistence
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    tables: HashMap<String, SerializableTable>,
}

impl Serialize for InMemory {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let tables = self.tables.read().unwrap();
        let tables = tables
            .iter()
            .map(|(name, data)| {
                (
                    name.clone(),
                    SerializableTable {
                        schema: data.schema.clone(),
                        next_id: data.next_id,
                        rows: data.rows.values().cloned().collect(),
                    },
                )
            })
            .collect();
        SerializableStore { tables }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InMemory {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let serializable = SerializableStore::deserialize(deserializer)?;
        let tables = serializable
            .tables
            .into_iter()
            .map(|(name, table)| {
                (
                    name,
                    TableData {
                        schema: table.schema,
                        next_id: table.next_id,
                        rows: table.rows.into_iter().map(|row| (row.id, row)).collect(),
                    },
                )
            })
            .collect();
        Ok(InMemory {
            tables: RwLock::new(tables),
        })
    }
}

impl InMemory {
    /// An empty store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table, replacing any previous registration of the same
    /// name.
    pub fn create_table(&self, schema: TableSchema) {
        let mut tables = self.tables.write().unwrap();
        tables.insert(schema.name().to_string(), TableData::new(schema));
    }

    /// Inserts a row and returns its assigned id.
    ///
    /// Column names are validated against the table schema. If the table
    /// declares `created_at` and the caller did not supply one, the current
    /// time is stamped; the lock revision starts at 0.
    pub fn insert(
        &self,
        source: &str,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<RowId> {
        let mut tables = self.tables.write().unwrap();
        let table = Self::table_mut(&mut tables, source)?;

        let mut row_values = BTreeMap::new();
        for (column, value) in values {
            Self::check_column(&table.schema, &column)?;
            row_values.insert(column, value);
        }
        if table.schema.has_column(CREATED_AT_COLUMN)
            && !row_values.contains_key(CREATED_AT_COLUMN)
        {
            row_values.insert(CREATED_AT_COLUMN.to_string(), Value::Timestamp(Utc::now()));
        }

        let id = RowId(table.next_id);
        table.next_id += 1;
        table.rows.insert(
            id,
            StoredRow {
                id,
                values: row_values,
                lock_version: 0,
            },
        );
        trace!("inserted {source}#{id}");
        Ok(id)
    }

    /// Point read of one row.
    pub fn get(&self, source: &str, id: RowId) -> Result<StoredRow> {
        let tables = self.tables.read().unwrap();
        let table = Self::table(&tables, source)?;
        table.rows.get(&id).cloned().ok_or_else(|| {
            StoreError::RowNotFound {
                table: source.to_string(),
                id,
            }
            .into()
        })
    }

    /// Optimistic point write of one row.
    ///
    /// When `expected_lock` is supplied and does not match the stored
    /// revision the write fails with [`StoreError::StaleWrite`]; on success
    /// the revision is bumped. Returns the row as written.
    pub fn update(
        &self,
        source: &str,
        id: RowId,
        values: impl IntoIterator<Item = (String, Value)>,
        expected_lock: Option<i64>,
    ) -> Result<StoredRow> {
        let mut tables = self.tables.write().unwrap();
        let table = Self::table_mut(&mut tables, source)?;

        let mut staged = BTreeMap::new();
        for (column, value) in values {
            Self::check_column(&table.schema, &column)?;
            staged.insert(column, value);
        }

        let row = table.rows.get_mut(&id).ok_or_else(|| StoreError::RowNotFound {
            table: source.to_string(),
            id,
        })?;
        Self::check_lock(source, row, expected_lock)?;
        row.values.extend(staged);
        row.lock_version += 1;
        Ok(row.clone())
    }

    /// Optimistic delete of one row, returning its last stored state.
    ///
    /// The same stale-write rule as [`update`](InMemory::update) applies.
    pub fn delete(
        &self,
        source: &str,
        id: RowId,
        expected_lock: Option<i64>,
    ) -> Result<StoredRow> {
        let mut tables = self.tables.write().unwrap();
        let table = Self::table_mut(&mut tables, source)?;

        let row = table.rows.get(&id).ok_or_else(|| StoreError::RowNotFound {
            table: source.to_string(),
            id,
        })?;
        Self::check_lock(source, row, expected_lock)?;
        Ok(table.rows.remove(&id).expect("row present"))
    }

    /// All rows matching `predicate`, ordered by `order_column` ascending
    /// with ties broken by id.
    pub fn select(
        &self,
        source: &str,
        predicate: &Predicate,
        order_column: &str,
    ) -> Result<Vec<StoredRow>> {
        let tables = self.tables.read().unwrap();
        let table = Self::table(&tables, source)?;
        let mut rows: Vec<StoredRow> = table
            .rows
            .values()
            .filter(|row| predicate.matches(*row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.value(order_column)
                .cmp(&b.value(order_column))
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    /// Saves the store state to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(Error::Io)
    }

    /// Loads store state from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path).map_err(Error::Io)?;
        let store: Self = serde_json::from_str(&json)?;
        Ok(store)
    }

    fn table<'a>(
        tables: &'a HashMap<String, TableData>,
        source: &str,
    ) -> Result<&'a TableData> {
        tables.get(source).ok_or_else(|| {
            StoreError::UnknownSource {
                table: source.to_string(),
            }
            .into()
        })
    }

    fn table_mut<'a>(
        tables: &'a mut HashMap<String, TableData>,
        source: &str,
    ) -> Result<&'a mut TableData> {
        tables.get_mut(source).ok_or_else(|| {
            StoreError::UnknownSource {
                table: source.to_string(),
            }
            .into()
        })
    }

    fn check_column(schema: &TableSchema, column: &str) -> Result<()> {
        if schema.has_column(column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn {
                table: schema.name().to_string(),
                column: column.to_string(),
            }
            .into())
        }
    }

    fn check_lock(source: &str, row: &StoredRow, expected: Option<i64>) -> Result<()> {
        if let Some(expected) = expected
            && expected != row.lock_version
        {
            return Err(StoreError::StaleWrite {
                table: source.to_string(),
                id: row.id,
                expected,
                actual: row.lock_version,
            }
            .into());
        }
        Ok(())
    }
}

impl RecordStore for InMemory {
    fn max_position(
        &self,
        source: &str,
        scope: &Predicate,
        position_column: &str,
    ) -> Result<Option<i64>> {
        let tables = self.tables.read().unwrap();
        let table = Self::table(&tables, source)?;
        Ok(table
            .rows
            .values()
            .filter(|row| scope.matches(*row))
            .filter_map(|row| row.integer(position_column))
            .max())
    }

    fn find_ordered_ids(
        &self,
        source: &str,
        predicate: &Predicate,
        order_column: &str,
    ) -> Result<Vec<RowId>> {
        Ok(self
            .select(source, predicate, order_column)?
            .into_iter()
            .map(|row| row.id)
            .collect())
    }

    fn bulk_shift(
        &self,
        source: &str,
        predicate: &Predicate,
        update: &ShiftUpdate,
    ) -> Result<u64> {
        let mut tables = self.tables.write().unwrap();
        let table = Self::table_mut(&mut tables, source)?;
        Self::check_column(&table.schema, &update.column)?;

        let mut affected = 0;
        for row in table.rows.values_mut() {
            if !predicate.matches(&*row) {
                continue;
            }
            // Rows whose position is unset match only predicates without a
            // range bound; a shift cannot move them.
            let Some(current) = row.integer(&update.column) else {
                continue;
            };
            row.values.insert(
                update.column.clone(),
                Value::Integer(current + update.delta()),
            );
            if update.bump_lock_version {
                row.lock_version += 1;
            }
            affected += 1;
        }
        trace!("bulk shift on {source} matched {affected} rows ({predicate})");
        Ok(affected)
    }

    fn write_position(
        &self,
        source: &str,
        id: RowId,
        position_column: &str,
        position: i64,
    ) -> Result<()> {
        let mut tables = self.tables.write().unwrap();
        let table = Self::table_mut(&mut tables, source)?;
        Self::check_column(&table.schema, position_column)?;
        let row = table.rows.get_mut(&id).ok_or_else(|| StoreError::RowNotFound {
            table: source.to_string(),
            id,
        })?;
        row.values
            .insert(position_column.to_string(), Value::Integer(position));
        Ok(())
    }
}
