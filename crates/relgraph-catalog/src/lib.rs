//! Record counts for cardinality-driven filter ordering
//!
//! The host application supplies a [`RecordCounter`] that asks the database
//! how many rows a column holds. [`CardinalityComparer`] memoizes those
//! answers while ordering the columns of multi-column constraints, so the
//! most selective filter is offered first.
//!
//! ## Example
//!
//! ```rust,ignore
//! use relgraph_catalog::{CardinalityComparer, MockRecordCounterBuilder};
//!
//! let counter = MockRecordCounterBuilder::new()
//!     .with_count("public", "shipments", "warehouse_id", 4)
//!     .with_count("public", "shipments", "aisle", 60)
//!     .build();
//! let mut comparer = CardinalityComparer::new(&counter, set.name_comparer());
//! set.prioritize_multiple(&mut comparer)?;
//! ```

pub mod counter;
pub mod mock;
pub mod cardinality;

pub use counter::{CountError, RecordCounter};
pub use mock::{MockRecordCounter, MockRecordCounterBuilder};
pub use cardinality::CardinalityComparer;
