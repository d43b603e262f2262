//! Relgraph Core
//!
//! Identity and policy types shared by every relgraph crate.
//! Name equality and id allocation are always injected, never global.

pub mod identity;
pub mod naming;
pub mod ids;
pub mod config;

pub use identity::{FieldIdentity, IdentityError, IdentityPart};
pub use naming::{NameComparer, NameMatching, SharedNameComparer};
pub use ids::{IdGenerator, SequentialIdGenerator};
pub use config::{Config, ConfigError, IdConfig, NamingConfig, OrderDirection, OrderingConfig};
