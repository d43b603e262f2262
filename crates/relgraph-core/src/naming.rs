//! Name equality strategies for schema, table and column names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Decides whether two schema/table/column names refer to the same object
///
/// Every graph and collection operation takes one of these instead of
/// comparing strings directly, so the matching policy of the host database
/// (case folding, padding) stays a caller decision.
pub trait NameComparer: fmt::Debug + Send + Sync {
    /// Whether `a` and `b` name the same object
    fn names_equal(&self, a: &str, b: &str) -> bool;

    /// Whether `name` matches any entry of `names`
    fn contains(&self, names: &[&str], name: &str) -> bool {
        names.iter().any(|candidate| self.names_equal(candidate, name))
    }
}

/// Name comparer shared between a collection and the graphs derived from it
pub type SharedNameComparer = Arc<dyn NameComparer>;

/// Standard matching policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameMatching {
    /// Compare names byte for byte when true, ASCII case-folded otherwise
    pub case_sensitive: bool,

    /// Ignore leading and trailing whitespace (fixed-width catalog columns pad names)
    pub trim_whitespace: bool,
}

impl NameMatching {
    /// Exact comparison, no folding and no trimming
    pub fn exact() -> Self {
        Self {
            case_sensitive: true,
            trim_whitespace: false,
        }
    }

    /// Case-insensitive comparison with whitespace trimming
    pub fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
            trim_whitespace: true,
        }
    }

    /// Wrap this policy for sharing
    pub fn shared(self) -> SharedNameComparer {
        Arc::new(self)
    }
}

impl Default for NameMatching {
    fn default() -> Self {
        Self::case_insensitive()
    }
}

impl NameComparer for NameMatching {
    fn names_equal(&self, a: &str, b: &str) -> bool {
        let (a, b) = if self.trim_whitespace {
            (a.trim(), b.trim())
        } else {
            (a, b)
        };

        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }
}

impl<T: NameComparer + ?Sized> NameComparer for Arc<T> {
    fn names_equal(&self, a: &str, b: &str) -> bool {
        (**self).names_equal(a, b)
    }
}

impl<T: NameComparer + ?Sized> NameComparer for &T {
    fn names_equal(&self, a: &str, b: &str) -> bool {
        (**self).names_equal(a, b)
    }
}
