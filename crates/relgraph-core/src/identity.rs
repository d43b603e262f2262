//! Schema/table/column identity

use crate::naming::NameComparer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one column of one table
///
/// The derived `PartialEq` is exact string equality. Code that matches
/// names supplied by users or catalogs goes through [`FieldIdentity::equals`]
/// with the active [`NameComparer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldIdentity {
    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,

    /// Column name
    pub column: String,
}

/// Which part of a [`FieldIdentity`] differed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPart {
    Schema,
    Table,
    Column,
}

impl fmt::Display for IdentityPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// Errors raised when two identities were required to match
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Field identity mismatch: {part} name '{actual}' does not match '{expected}'")]
    Mismatch {
        part: IdentityPart,
        expected: String,
        actual: String,
    },
}

impl FieldIdentity {
    /// Create a new field identity
    pub fn new(schema: impl Into<String>, table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    /// Get fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.schema, self.table, self.column)
    }

    /// Whether this identity belongs to `table` in `schema`
    pub fn is_in_table(&self, schema: &str, table: &str, names: &dyn NameComparer) -> bool {
        names.names_equal(&self.schema, schema) && names.names_equal(&self.table, table)
    }

    /// Compare all three parts under `names`
    pub fn equals(&self, other: &FieldIdentity, names: &dyn NameComparer) -> bool {
        self.first_mismatch(other, names).is_none()
    }

    /// Like [`equals`](Self::equals), but a mismatch is reported as an error naming
    /// the first differing part, checked in schema, table, column order
    pub fn equals_or_error(&self, other: &FieldIdentity, names: &dyn NameComparer) -> Result<(), IdentityError> {
        match self.first_mismatch(other, names) {
            None => Ok(()),
            Some(part) => {
                let (expected, actual) = match part {
                    IdentityPart::Schema => (&self.schema, &other.schema),
                    IdentityPart::Table => (&self.table, &other.table),
                    IdentityPart::Column => (&self.column, &other.column),
                };
                Err(IdentityError::Mismatch {
                    part,
                    expected: expected.clone(),
                    actual: actual.clone(),
                })
            }
        }
    }

    fn first_mismatch(&self, other: &FieldIdentity, names: &dyn NameComparer) -> Option<IdentityPart> {
        if !names.names_equal(&self.schema, &other.schema) {
            Some(IdentityPart::Schema)
        } else if !names.names_equal(&self.table, &other.table) {
            Some(IdentityPart::Table)
        } else if !names.names_equal(&self.column, &other.column) {
            Some(IdentityPart::Column)
        } else {
            None
        }
    }
}

impl fmt::Display for FieldIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}
