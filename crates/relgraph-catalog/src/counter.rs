//! Record count collaborator supplied by the host application

use relgraph_core::FieldIdentity;

/// Errors that can occur when counting records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountError {
    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Counts the rows behind a column
///
/// Calls are synchronous; the caller waits for the database. Wrapping the
/// call in a timeout is the implementor's business, a timeout surfaces as
/// [`CountError::Timeout`].
pub trait RecordCounter: Send + Sync {
    /// Get the counter name (e.g., "Postgres", "Mock")
    fn name(&self) -> &'static str;

    /// Number of records for `field`
    fn record_count(&self, field: &FieldIdentity) -> Result<u64, CountError>;
}

impl<T: RecordCounter + ?Sized> RecordCounter for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn record_count(&self, field: &FieldIdentity) -> Result<u64, CountError> {
        (**self).record_count(field)
    }
}
