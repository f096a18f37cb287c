//! List configuration and usage error types.

use thiserror::Error;

/// Errors raised by [`PositionList`](super::PositionList) itself, as opposed
/// to failures propagated from the record store.
///
/// Configuration variants surface at [`configure`](super::PositionList::configure)
/// time, never at call time.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ListError {
    /// The configured ordering column does not exist on the table.
    #[error("position column '{column}' does not exist on {table}")]
    UnknownPositionColumn {
        /// The table the list was configured for
        table: String,
        /// The configured column name
        column: String,
    },

    /// A scope attribute resolves to no column, neither bare nor with the
    /// `_id` suffix.
    #[error(
        "scope attribute '{attribute}' resolves to no column on {table} (tried '{attribute}', '{suffixed}')"
    )]
    UnknownScopeColumn {
        /// The table the list was configured for
        table: String,
        /// The attribute as configured
        attribute: String,
        /// The `_id`-suffixed candidate that was also tried
        suffixed: String,
    },

    /// A snapshot carried the wrong number of scope values for this list.
    #[error("expected {expected} scope values, got {actual}")]
    ScopeArityMismatch {
        /// Number of configured scope columns
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },
}

impl ListError {
    /// Check if this error is an invalid-configuration failure.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ListError::UnknownPositionColumn { .. } | ListError::UnknownScopeColumn { .. }
        )
    }

    /// Get the table name if this error is about a specific table.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            ListError::UnknownPositionColumn { table, .. }
            | ListError::UnknownScopeColumn { table, .. } => Some(table),
            ListError::ScopeArityMismatch { .. } => None,
        }
    }
}

// Conversion from ListError to the main Error type
impl From<ListError> for crate::Error {
    fn from(err: ListError) -> Self {
        crate::Error::List(err)
    }
}
