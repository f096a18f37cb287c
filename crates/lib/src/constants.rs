//! Constants used throughout the lineup crate.

/// Ordering column used when a list does not configure one explicitly.
pub const DEFAULT_POSITION_COLUMN: &str = "position";

/// Column probed to decide whether bulk shifts bump an optimistic-lock
/// revision alongside the position change.
pub const LOCK_VERSION_COLUMN: &str = "lock_version";

/// Primary-key column of the backing table.
pub const ID_COLUMN: &str = "id";

/// Creation-timestamp column; the stable secondary ordering used by the
/// re-sequence repair path.
pub const CREATED_AT_COLUMN: &str = "created_at";
