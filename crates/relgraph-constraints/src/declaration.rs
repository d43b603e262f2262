//! Constraint declarations as read from catalogs or files
//!
//! A declaration is one column pair of one foreign key, flattened the way
//! `information_schema` reports them. Multi-column keys appear as several
//! declarations sharing a name.

use crate::column::ConstraintColumn;
use crate::set::ConstraintSet;
use relgraph_core::{Config, FieldIdentity};
use serde::{Deserialize, Serialize};

/// Errors loading constraint declarations
#[derive(Debug, thiserror::Error)]
pub enum ConstraintError {
    #[error("Invalid declaration: {0}")]
    Declaration(String),
}

/// One column pair of a named foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDeclaration {
    /// Constraint name
    pub name: String,

    /// Schema of the referencing table (default schema when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Referencing table
    pub table: String,

    /// Referencing column
    pub column: String,

    /// Schema of the referenced table (same as `schema` when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_schema: Option<String>,

    /// Referenced table
    pub referenced_table: String,

    /// Referenced column
    pub referenced_column: String,
}

impl ConstraintDeclaration {
    /// Create a declaration in the default schema
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schema: None,
            table: table.into(),
            column: column.into(),
            referenced_schema: None,
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }

    /// Set the schema of the referencing table
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Check that every name is present
    pub fn validate(&self) -> Result<(), ConstraintError> {
        let parts = [
            ("name", &self.name),
            ("table", &self.table),
            ("column", &self.column),
            ("referenced_table", &self.referenced_table),
            ("referenced_column", &self.referenced_column),
        ];

        for (part, value) in parts {
            if value.trim().is_empty() {
                return Err(ConstraintError::Declaration(format!(
                    "constraint '{}' has an empty {}",
                    self.name, part
                )));
            }
        }

        Ok(())
    }

    /// Resolve both sides to field identities
    pub fn fields(&self, default_schema: &str) -> (FieldIdentity, FieldIdentity) {
        let schema = self.schema.as_deref().unwrap_or(default_schema);
        let referenced_schema = self.referenced_schema.as_deref().unwrap_or(schema);

        (
            FieldIdentity::new(schema, self.table.as_str(), self.column.as_str()),
            FieldIdentity::new(referenced_schema, self.referenced_table.as_str(), self.referenced_column.as_str()),
        )
    }

    /// Declaration describing an existing column pair
    pub fn from_column(name: &str, pair: &ConstraintColumn) -> Self {
        Self {
            name: name.to_string(),
            schema: Some(pair.column.schema.clone()),
            table: pair.column.table.clone(),
            column: pair.column.column.clone(),
            referenced_schema: Some(pair.referenced_column.schema.clone()),
            referenced_table: pair.referenced_column.table.clone(),
            referenced_column: pair.referenced_column.column.clone(),
        }
    }
}

/// Parse a JSON array of declarations
pub fn parse_declarations(json: &str) -> Result<Vec<ConstraintDeclaration>, ConstraintError> {
    let declarations: Vec<ConstraintDeclaration> =
        serde_json::from_str(json).map_err(|e| ConstraintError::Declaration(e.to_string()))?;

    for declaration in &declarations {
        declaration.validate()?;
    }

    Ok(declarations)
}

impl ConstraintSet {
    /// Build a set configured by `config` and load every declaration into it
    pub fn from_declarations<'a, I>(config: &Config, declarations: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = &'a ConstraintDeclaration>,
    {
        let mut set = Self::from_config(config);
        set.extend_declarations(declarations)?;
        Ok(set)
    }

    /// Add one declared column pair
    pub fn add_declaration(&mut self, declaration: &ConstraintDeclaration) -> Result<&ConstraintColumn, ConstraintError> {
        declaration.validate()?;
        let (column, referenced) = declaration.fields(self.default_schema());
        Ok(self.add_constraint_field(&declaration.name, column, referenced))
    }

    /// Add every declaration, returning how many pairs were added
    pub fn extend_declarations<'a, I>(&mut self, declarations: I) -> Result<usize, ConstraintError>
    where
        I: IntoIterator<Item = &'a ConstraintDeclaration>,
    {
        let mut added = 0;
        for declaration in declarations {
            self.add_declaration(declaration)?;
            added += 1;
        }
        Ok(added)
    }

    /// Flatten the set back into declarations
    pub fn to_declarations(&self) -> Vec<ConstraintDeclaration> {
        self.iter()
            .flat_map(|constraint| {
                constraint
                    .columns
                    .iter()
                    .map(move |pair| ConstraintDeclaration::from_column(&constraint.name, pair))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_load() {
        let json = r#"[
            {"name": "fk_orders_customer", "table": "orders", "column": "customer_id",
             "referenced_table": "customers", "referenced_column": "id"},
            {"name": "fk_bin", "schema": "stock", "table": "shipments", "column": "aisle",
             "referenced_table": "bins", "referenced_column": "aisle"},
            {"name": "fk_bin", "schema": "stock", "table": "shipments", "column": "shelf",
             "referenced_table": "bins", "referenced_column": "shelf"}
        ]"#;

        let declarations = parse_declarations(json).unwrap();
        assert_eq!(declarations.len(), 3);

        let mut set = ConstraintSet::from_config(&Config::default());
        assert_eq!(set.extend_declarations(&declarations).unwrap(), 3);
        assert_eq!(set.len(), 2);

        let bin = set.find_constraint("fk_bin").unwrap();
        assert_eq!(bin.columns.first().unwrap().referenced_column.schema, "stock");
        let customer = set.find_constraint("fk_orders_customer").unwrap();
        assert_eq!(customer.columns.first().unwrap().column.schema, "public");
    }

    #[test]
    fn empty_names_are_rejected() {
        let json = r#"[{"name": "fk", "table": "orders", "column": " ",
                        "referenced_table": "customers", "referenced_column": "id"}]"#;
        let err = parse_declarations(json).unwrap_err();
        assert!(err.to_string().contains("empty column"));

        assert!(matches!(parse_declarations("{"), Err(ConstraintError::Declaration(_))));
    }

    #[test]
    fn referenced_schema_defaults_to_schema() {
        let declaration = ConstraintDeclaration::new("fk", "orders", "customer_id", "customers", "id")
            .with_schema("sales");
        let (column, referenced) = declaration.fields("public");
        assert_eq!(column.schema, "sales");
        assert_eq!(referenced.schema, "sales");
    }

    #[test]
    fn declarations_round_trip_through_set() {
        let declarations = vec![
            ConstraintDeclaration::new("fk_a", "a", "b_id", "b", "id"),
            ConstraintDeclaration::new("fk_c", "c", "a_id", "a", "id"),
        ];
        let set = ConstraintSet::from_declarations(&Config::default(), &declarations).unwrap();

        let flattened = set.to_declarations();
        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[1].table, "c");
        assert_eq!(flattened[1].schema.as_deref(), Some("public"));
    }
}
