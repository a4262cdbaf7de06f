//! Declarative table contracts
//!
//! A `SchemaContract` is a pure value object fixed at construction: the
//! ordered column set plus the per-column constraints the store enforces.

use crate::error::{PamError, Result};
use crate::types::ColumnType;
use std::collections::{HashMap, HashSet};

/// Declarative description of the required table shape and constraints
///
/// Immutable once built. Every column referenced by a constraint is
/// guaranteed to exist in the column set; the builder rejects anything else.
#[derive(Debug, Clone)]
pub struct SchemaContract {
    columns: Vec<String>,
    types: HashMap<String, ColumnType>,
    required: HashSet<String>,
    unique: HashSet<String>,
    enums: HashMap<String, Vec<String>>,
    date_columns: Vec<String>,
}

impl SchemaContract {
    /// Start building a contract over the given canonical column order
    pub fn builder<I, S>(columns: I) -> SchemaContractBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaContractBuilder {
            contract: SchemaContract {
                columns: columns.into_iter().map(Into::into).collect(),
                types: HashMap::new(),
                required: HashSet::new(),
                unique: HashSet::new(),
                enums: HashMap::new(),
                date_columns: Vec::new(),
            },
        }
    }

    /// Canonical column order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.types.get(column).copied()
    }

    pub fn is_required(&self, column: &str) -> bool {
        self.required.contains(column)
    }

    pub fn is_unique(&self, column: &str) -> bool {
        self.unique.contains(column)
    }

    pub fn enum_values(&self, column: &str) -> Option<&[String]> {
        self.enums.get(column).map(|v| v.as_slice())
    }

    pub fn date_columns(&self) -> &[String] {
        &self.date_columns
    }
}

/// Builder for `SchemaContract`
///
/// `build` fails with `PamError::Config` if any constraint references a
/// column outside the declared column set.
#[derive(Debug)]
pub struct SchemaContractBuilder {
    contract: SchemaContract,
}

impl SchemaContractBuilder {
    /// Declare the type a column must coerce to
    pub fn column_type(mut self, column: impl Into<String>, ty: ColumnType) -> Self {
        self.contract.types.insert(column.into(), ty);
        self
    }

    /// Mark a column as mandatory (no nulls allowed)
    pub fn required(mut self, column: impl Into<String>) -> Self {
        self.contract.required.insert(column.into());
        self
    }

    /// Mark a column as unique (no duplicate values allowed)
    pub fn unique(mut self, column: impl Into<String>) -> Self {
        self.contract.unique.insert(column.into());
        self
    }

    /// Restrict a column to a fixed set of categorical values
    pub fn enum_values<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contract
            .enums
            .insert(column.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Declare a column as date-like, normalized to ISO 8601 on load and save
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.contract.date_columns.push(column.into());
        self
    }

    /// Finalize the contract, checking constraint references eagerly
    pub fn build(self) -> Result<SchemaContract> {
        let known: HashSet<&str> = self.contract.columns.iter().map(String::as_str).collect();

        let mut unknown: Vec<&str> = self
            .contract
            .types
            .keys()
            .chain(self.contract.enums.keys())
            .map(String::as_str)
            .chain(self.contract.required.iter().map(String::as_str))
            .chain(self.contract.unique.iter().map(String::as_str))
            .chain(self.contract.date_columns.iter().map(String::as_str))
            .filter(|c| !known.contains(*c))
            .collect();

        if !unknown.is_empty() {
            unknown.sort_unstable();
            unknown.dedup();
            return Err(PamError::Config(format!(
                "contract constraints reference unknown columns: {}",
                unknown.join(", ")
            )));
        }

        Ok(self.contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accepts_known_columns() {
        let contract = SchemaContract::builder(["mediaID", "filePath", "timestamp"])
            .column_type("mediaID", ColumnType::Str)
            .required("mediaID")
            .unique("mediaID")
            .date_column("timestamp")
            .build()
            .expect("valid contract");

        assert_eq!(contract.columns(), ["mediaID", "filePath", "timestamp"]);
        assert!(contract.is_required("mediaID"));
        assert!(contract.is_unique("mediaID"));
        assert!(!contract.is_unique("filePath"));
        assert_eq!(contract.date_columns(), ["timestamp"]);
    }

    #[test]
    fn test_builder_rejects_unknown_constraint_columns() {
        let err = SchemaContract::builder(["a", "b"])
            .required("c")
            .unique("d")
            .build()
            .expect_err("unknown columns must be rejected");

        let msg = err.to_string();
        assert!(msg.ends_with("c, d"), "got: {msg}");
    }

    #[test]
    fn test_builder_rejects_unknown_enum_column() {
        let err = SchemaContract::builder(["a"])
            .enum_values("missing", ["x", "y"])
            .build()
            .expect_err("unknown enum column must be rejected");
        assert!(matches!(err, PamError::Config(_)));
    }
}
