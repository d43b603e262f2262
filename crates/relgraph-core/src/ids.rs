//! Unique id allocation for constraint columns
//!
//! Ids are handles for UI code that needs to point at one column pair.
//! They never take part in equality.

/// Hands out unique, monotonically increasing ids
pub trait IdGenerator: std::fmt::Debug {
    /// Allocate the next id
    fn next_id(&mut self) -> u64;
}

/// Counter starting at a configurable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    /// Create a generator whose first id is `start`
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    /// The id the next call to `next_id` returns
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }
}
