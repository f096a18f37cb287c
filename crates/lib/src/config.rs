//! List declaration surface.
//!
//! A [`ListConfig`] names the ordering column and the scope attributes that
//! partition rows into independently-ordered groups. A [`TableSchema`] names
//! the columns the backing table actually has; configuration is resolved
//! against it once, at [`PositionList::configure`] time, so an invalid
//! column name fails fast instead of at the first operation.
//!
//! [`PositionList::configure`]: crate::list::PositionList::configure

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::DEFAULT_POSITION_COLUMN;

/// The column universe of one backing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    columns: BTreeSet<String>,
}

impl TableSchema {
    /// A schema for the named table with no columns yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeSet::new(),
        }
    }

    /// Adds a column to the schema.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns.insert(column.into());
        self
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the table has the named column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// The column names, sorted.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

/// Per-table ordering configuration.
///
/// Options:
/// * `position_column`: the integer ordering attribute, `"position"` by
///   default.
/// * `scope`: zero or more attribute names partitioning rows into groups.
///   An attribute may be given with or without its `_id` suffix; if the
///   bare name matches a table column it is used literally, otherwise
///   `_id` is appended. Multiple attributes combine with logical AND, in
///   declaration order. With no scope the whole table is one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_position_column")]
    position_column: String,
    #[serde(default)]
    scope: Vec<String>,
}

fn default_position_column() -> String {
    DEFAULT_POSITION_COLUMN.to_string()
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ListConfig {
    /// The default configuration: `position` column, unscoped.
    pub fn new() -> Self {
        Self {
            position_column: default_position_column(),
            scope: Vec::new(),
        }
    }

    /// Overrides the ordering column.
    pub fn with_position_column(mut self, column: impl Into<String>) -> Self {
        self.position_column = column.into();
        self
    }

    /// Appends a scope attribute.
    pub fn with_scope(mut self, attribute: impl Into<String>) -> Self {
        self.scope.push(attribute.into());
        self
    }

    /// The configured ordering column.
    pub fn position_column(&self) -> &str {
        &self.position_column
    }

    /// The configured scope attributes, in declaration order.
    pub fn scope(&self) -> &[String] {
        &self.scope
    }
}
