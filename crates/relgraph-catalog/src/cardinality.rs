//! Cardinality-driven ordering of constraint columns
//!
//! Counts are fetched from a [`RecordCounter`] on first use and memoized for
//! the lifetime of the comparer. There is no invalidation: build a fresh
//! comparer for each prioritization pass if counts may have moved.

use crate::counter::{CountError, RecordCounter};
use relgraph_constraints::{ColumnComparer, ConstraintColumn};
use relgraph_core::{FieldIdentity, SharedNameComparer};
use std::cmp::Ordering;
use tracing::debug;

/// Orders constraint columns by ascending record count of their
/// referencing field
pub struct CardinalityComparer<'c> {
    /// Where counts come from
    counter: &'c dyn RecordCounter,

    /// Field name equality for cache lookups
    names: SharedNameComparer,

    /// Memoized counts
    cache: Vec<(FieldIdentity, u64)>,

    /// Number of calls issued to the counter
    fetches: usize,
}

impl<'c> CardinalityComparer<'c> {
    /// Create a comparer with an empty cache
    pub fn new(counter: &'c dyn RecordCounter, names: SharedNameComparer) -> Self {
        Self {
            counter,
            names,
            cache: Vec::new(),
            fetches: 0,
        }
    }

    /// Compare two columns by the record count of their referencing field
    pub fn compare(&mut self, x: &ConstraintColumn, y: &ConstraintColumn) -> Result<Ordering, CountError> {
        let x_count = self.record_count(&x.column)?;
        let y_count = self.record_count(&y.column)?;
        Ok(x_count.cmp(&y_count))
    }

    /// Record count for `field`, asking the counter only on a cache miss
    pub fn record_count(&mut self, field: &FieldIdentity) -> Result<u64, CountError> {
        if let Some(count) = self.cached_count(field) {
            return Ok(count);
        }

        let count = self.counter.record_count(field)?;
        self.fetches += 1;
        debug!(counter = self.counter.name(), field = %field, count, "fetched record count");

        self.cache.push((field.clone(), count));
        Ok(count)
    }

    /// Cached count for `field`, without asking the counter
    pub fn cached_count(&self, field: &FieldIdentity) -> Option<u64> {
        self.cache
            .iter()
            .find(|(cached, _)| cached.equals(field, self.names.as_ref()))
            .map(|(_, count)| *count)
    }

    /// Number of calls issued to the counter
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Number of cached counts
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Forget every cached count
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl ColumnComparer for CardinalityComparer<'_> {
    type Error = CountError;

    fn compare_columns(&mut self, a: &ConstraintColumn, b: &ConstraintColumn) -> Result<Ordering, CountError> {
        self.compare(a, b)
    }
}
