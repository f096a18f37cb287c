//!
//! Lineup: dense, gap-free list ordering for grouped records.
//!
//! Lineup maintains an integer "position" column over the rows of a
//! relational-style table so that rows can be listed in a stable
//! user-defined sequence, appended, reinserted at an arbitrary rank, moved
//! between sibling groups, and removed, while every other row's position in
//! the group stays a contiguous 1..N run.
//!
//! ## Core Concepts
//!
//! * **Groups**: rows sharing identical scope-column values order
//!   independently of each other; with no scope configured the whole table
//!   is one group. Groups are never materialized; they are identified by a
//!   [`Predicate`](predicate::Predicate) computed on demand.
//! * **Lifecycle hooks ([`PositionList`])**: the host calls
//!   `on_before_insert`, `on_after_update`, and `on_after_delete` around its
//!   own writes, passing explicit before/after snapshots
//!   ([`RowSnapshot`], [`RowChange`]); the list answers with the scoped bulk
//!   shifts that keep each touched group dense.
//! * **Stores ([`store::RecordStore`])**: a pluggable synchronous storage
//!   layer offering scoped reads and bulk position shifts.
//!   [`store::InMemory`] ships with the crate.
//! * **Optimistic locking**: when the table carries a `lock_version`
//!   column, every shift bumps the revision of the rows it touches, so a
//!   racing writer holding a pre-shift snapshot gets a
//!   [`StoreError::StaleWrite`](store::StoreError::StaleWrite) instead of
//!   silently corrupting the order.
//!
//! Each operation expects to run inside a single host-supplied transaction
//! alongside the primary write that triggered it; the list performs no
//! retries and no compensating writes of its own.

pub mod config;
pub mod constants;
pub mod list;
pub mod predicate;
pub mod row;
pub mod store;
pub mod value;

pub use config::{ListConfig, TableSchema};
pub use list::PositionList;
pub use row::{PendingRow, RowChange, RowId, RowSnapshot};
pub use value::Value;

/// Result type used throughout the lineup library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the lineup library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured list errors from the list module
    #[error(transparent)]
    List(list::ListError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::List(_) => "list",
            Error::Store(_) => "store",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is an optimistic-lock conflict.
    ///
    /// Distinguishable from ordinary failures so callers can refresh their
    /// snapshot and retry the whole operation.
    pub fn is_stale_write(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_stale_write(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is an invalid-configuration failure.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::List(list_err) => list_err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if this error is a transport-level store failure.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_unavailable(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}
