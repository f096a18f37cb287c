//! Record-store abstraction.
//!
//! [`RecordStore`] is the contract the position manager consumes: scoped
//! point reads, one scoped bulk update, and a direct position write for the
//! repair path. The manager is independent of how rows are persisted; the
//! crate ships [`InMemory`] for tests, development, and host emulation.
//!
//! All calls are synchronous and blocking. Each manager operation runs
//! inside a single host-supplied transaction, so implementations backed by a
//! real database are expected to execute these calls on that transaction's
//! connection.

use crate::Result;
use crate::predicate::{Predicate, ShiftUpdate};
use crate::row::RowId;

mod errors;
pub use errors::StoreError;

mod memory;
pub use memory::{InMemory, StoredRow};

/// Storage contract consumed by the position manager.
///
/// `source` is the table the configured list lives in. Implementations must
/// be shareable across threads; the manager itself never holds a row open
/// for write across more than one call.
pub trait RecordStore: Send + Sync {
    /// The maximum value of `position_column` among rows matching `scope`.
    ///
    /// Returns `Ok(None)` when no matching row has a position, either
    /// because the group is empty or because every member's position is
    /// unset. Callers that need to distinguish those cases follow up with
    /// [`find_ordered_ids`].
    ///
    /// [`find_ordered_ids`]: RecordStore::find_ordered_ids
    fn max_position(
        &self,
        source: &str,
        scope: &Predicate,
        position_column: &str,
    ) -> Result<Option<i64>>;

    /// Ids of all rows matching `predicate`, ordered by `order_column`
    /// ascending with ties broken by id.
    ///
    /// Used only by the re-sequence repair path, with the creation-timestamp
    /// column as the stable secondary key.
    fn find_ordered_ids(
        &self,
        source: &str,
        predicate: &Predicate,
        order_column: &str,
    ) -> Result<Vec<RowId>>;

    /// Applies `update` (`position = position ± 1`, optionally
    /// `lock_version = lock_version + 1`) to every row matching `predicate`.
    ///
    /// Returns the number of rows affected.
    fn bulk_shift(
        &self,
        source: &str,
        predicate: &Predicate,
        update: &ShiftUpdate,
    ) -> Result<u64>;

    /// Writes `position` directly to one row, bypassing shift logic.
    ///
    /// Used only by the re-sequence repair path. May surface a stale-write
    /// conflict from stores that track open revisions.
    fn write_position(
        &self,
        source: &str,
        id: RowId,
        position_column: &str,
        position: i64,
    ) -> Result<()>;
}
