//! Mock record counter for testing
//!
//! This counter returns predefined counts without touching a database.
//! It's useful for:
//! - Unit testing cardinality ordering
//! - Counting how often the database would have been asked
//! - Simulating query failures for specific columns
//! - Feeding fixed counts to the CLI
//!
//! Counts are keyed by fully qualified field name (`schema.table.column`).
//! Lookups try the exact name first, then the injected name comparer
//! (exact matching unless [`MockRecordCounter::with_name_comparer`] says
//! otherwise).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relgraph_catalog::{MockRecordCounter, RecordCounter};
//! use relgraph_core::FieldIdentity;
//!
//! let counter = MockRecordCounter::new();
//! let field = FieldIdentity::new("public", "orders", "customer_id");
//! counter.add_count(&field, 1200);
//!
//! assert_eq!(counter.record_count(&field)?, 1200);
//! assert_eq!(counter.call_count(), 1);
//! ```

use crate::counter::{CountError, RecordCounter};
use relgraph_core::{FieldIdentity, NameComparer, NameMatching, SharedNameComparer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Mock record counter for testing
///
/// Stores counts in memory and records every call made through
/// [`RecordCounter::record_count`].
pub struct MockRecordCounter {
    /// Predefined counts by field FQN
    counts: Arc<RwLock<HashMap<String, u64>>>,

    /// Errors to return for specific fields
    errors: Arc<RwLock<HashMap<String, CountError>>>,

    /// Count returned for unknown fields; unknown fields fail when `None`
    default_count: Option<u64>,

    /// Number of record_count calls
    calls: Arc<AtomicUsize>,

    /// Name to return from name() method
    counter_name: &'static str,

    /// Fallback key matching when the exact FQN is absent
    names: SharedNameComparer,
}

impl MockRecordCounter {
    /// Create a new mock counter with no predefined counts
    pub fn new() -> Self {
        Self::from_counts(HashMap::new())
    }

    /// Create a mock counter from a map of FQN to count
    pub fn from_counts(counts: HashMap<String, u64>) -> Self {
        Self {
            counts: Arc::new(RwLock::new(counts)),
            errors: Arc::new(RwLock::new(HashMap::new())),
            default_count: None,
            calls: Arc::new(AtomicUsize::new(0)),
            counter_name: "Mock",
            names: NameMatching::exact().shared(),
        }
    }

    /// Parse a JSON object mapping FQNs to counts
    ///
    /// ```json
    /// { "public.shipments.warehouse_id": 4, "public.shipments.aisle": 60 }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, CountError> {
        let counts: HashMap<String, u64> =
            serde_json::from_str(json).map_err(|e| CountError::ConfigError(e.to_string()))?;
        Ok(Self::from_counts(counts))
    }

    /// Set the count for a field
    pub fn add_count(&self, field: &FieldIdentity, count: u64) {
        write(&self.counts).insert(field.fqn(), count);
    }

    /// Set the count using string identifiers for convenience
    pub fn add_count_for(&self, schema: &str, table: &str, column: &str, count: u64) {
        self.add_count(&FieldIdentity::new(schema, table, column), count);
    }

    /// Configure an error to be returned for a specific field
    pub fn add_error_for_field(&self, field: &FieldIdentity, error: CountError) {
        write(&self.errors).insert(field.fqn(), error);
    }

    /// Answer `count` for fields without a predefined count
    pub fn with_default_count(mut self, count: u64) -> Self {
        self.default_count = Some(count);
        self
    }

    /// Set a custom counter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.counter_name = name;
        self
    }

    /// Match field names that are not stored verbatim with `names`
    pub fn with_name_comparer(mut self, names: SharedNameComparer) -> Self {
        self.names = names;
        self
    }

    /// Number of times record_count has been called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reset the call counter
    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Check if a count exists for a field
    pub fn has_count(&self, field: &FieldIdentity) -> bool {
        lookup(&*read(&self.counts), self.names.as_ref(), &field.fqn()).is_some()
    }

    /// Get the number of counts stored
    pub fn len(&self) -> usize {
        read(&self.counts).len()
    }

    /// Check if no counts are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all stored counts
    pub fn clear_counts(&self) {
        write(&self.counts).clear();
    }
}

// A panic while a test held the lock leaves the map itself intact
fn read<V>(lock: &RwLock<HashMap<String, V>>) -> RwLockReadGuard<'_, HashMap<String, V>> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<V>(lock: &RwLock<HashMap<String, V>>) -> RwLockWriteGuard<'_, HashMap<String, V>> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lookup<'m, V>(map: &'m HashMap<String, V>, names: &dyn NameComparer, fqn: &str) -> Option<&'m V> {
    map.get(fqn).or_else(|| {
        map.iter()
            .find(|(key, _)| names.names_equal(key, fqn))
            .map(|(_, value)| value)
    })
}

impl Default for MockRecordCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockRecordCounter {
    fn clone(&self) -> Self {
        Self {
            counts: Arc::clone(&self.counts),
            errors: Arc::clone(&self.errors),
            default_count: self.default_count,
            calls: Arc::clone(&self.calls),
            counter_name: self.counter_name,
            names: Arc::clone(&self.names),
        }
    }
}

impl RecordCounter for MockRecordCounter {
    fn name(&self) -> &'static str {
        self.counter_name
    }

    fn record_count(&self, field: &FieldIdentity) -> Result<u64, CountError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fqn = field.fqn();

        // Check for configured errors first
        if let Some(error) = lookup(&*read(&self.errors), self.names.as_ref(), &fqn) {
            return Err(error.clone());
        }

        lookup(&*read(&self.counts), self.names.as_ref(), &fqn)
            .copied()
            .or(self.default_count)
            .ok_or(CountError::FieldNotFound(fqn))
    }
}

/// Builder for creating MockRecordCounter with multiple counts
///
/// ```rust,ignore
/// let counter = MockRecordCounterBuilder::new()
///     .with_count("public", "shipments", "warehouse_id", 4)
///     .with_count("public", "shipments", "aisle", 60)
///     .with_error("public", "shipments", "shelf", CountError::Timeout("shelf".into()))
///     .build();
/// ```
pub struct MockRecordCounterBuilder {
    counts: HashMap<String, u64>,
    errors: HashMap<String, CountError>,
    default_count: Option<u64>,
    counter_name: &'static str,
    names: SharedNameComparer,
}

impl MockRecordCounterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            errors: HashMap::new(),
            default_count: None,
            counter_name: "Mock",
            names: NameMatching::exact().shared(),
        }
    }

    /// Add a count for a field
    pub fn with_count(mut self, schema: &str, table: &str, column: &str, count: u64) -> Self {
        self.counts.insert(FieldIdentity::new(schema, table, column).fqn(), count);
        self
    }

    /// Add an error for a field
    pub fn with_error(mut self, schema: &str, table: &str, column: &str, error: CountError) -> Self {
        self.errors.insert(FieldIdentity::new(schema, table, column).fqn(), error);
        self
    }

    /// Count returned for unknown fields
    pub fn with_default_count(mut self, count: u64) -> Self {
        self.default_count = Some(count);
        self
    }

    /// Set the counter name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.counter_name = name;
        self
    }

    /// Set the fallback key matching
    pub fn with_name_comparer(mut self, names: SharedNameComparer) -> Self {
        self.names = names;
        self
    }

    /// Build the MockRecordCounter
    pub fn build(self) -> MockRecordCounter {
        MockRecordCounter {
            counts: Arc::new(RwLock::new(self.counts)),
            errors: Arc::new(RwLock::new(self.errors)),
            default_count: self.default_count,
            calls: Arc::new(AtomicUsize::new(0)),
            counter_name: self.counter_name,
            names: self.names,
        }
    }
}

impl Default for MockRecordCounterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
