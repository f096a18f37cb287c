//! Store error types.
//!
//! Every store failure is fatal to the current operation and expected to
//! abort the enclosing host transaction; the manager performs no retries and
//! no compensating writes.

use thiserror::Error;

use crate::row::RowId;

/// Errors surfaced by [`RecordStore`](super::RecordStore) implementations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write was rejected because the row's optimistic-lock revision no
    /// longer matched the caller's snapshot.
    ///
    /// Distinguishable from ordinary failures so callers can prompt a
    /// refresh-and-retry of the whole operation with fresh data.
    #[error("stale write on {table}#{id}: expected lock_version {expected}, found {actual}")]
    StaleWrite {
        /// The table the write targeted
        table: String,
        /// The row the write targeted
        id: RowId,
        /// The revision the caller's snapshot held
        expected: i64,
        /// The revision actually stored
        actual: i64,
    },

    /// Point read or write addressed a row that does not exist.
    #[error("row not found: {table}#{id}")]
    RowNotFound {
        /// The table that was addressed
        table: String,
        /// The missing row id
        id: RowId,
    },

    /// The named table was never registered with the store.
    #[error("unknown source: {table}")]
    UnknownSource {
        /// The unknown table name
        table: String,
    },

    /// A write referenced a column the table does not have.
    #[error("unknown column '{column}' on {table}")]
    UnknownColumn {
        /// The table that was addressed
        table: String,
        /// The unknown column name
        column: String,
    },

    /// Any lower-level store failure (connection loss, constraint
    /// violation). Propagated unchanged; the core adds no wrapping
    /// semantics.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Description of the failure
        reason: String,
    },
}

impl StoreError {
    /// Check if this error is an optimistic-lock conflict.
    pub fn is_stale_write(&self) -> bool {
        matches!(self, StoreError::StaleWrite { .. })
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::RowNotFound { .. } | StoreError::UnknownSource { .. }
        )
    }

    /// Check if this error is a transport-level store failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }

    /// Get the row id if this error is about a specific row.
    pub fn row_id(&self) -> Option<RowId> {
        match self {
            StoreError::StaleWrite { id, .. } | StoreError::RowNotFound { id, .. } => Some(*id),
            _ => None,
        }
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
