//! Contract-enforcing table store
//!
//! Wraps a `TableBackend` and applies the `SchemaContract` on every load and
//! save. Validation is stateless and all-or-nothing: the first violation
//! aborts the call, nothing is cached between calls.
//!
//! The check order is fixed and load-bearing: columns, then types, then
//! required/null, then uniqueness, then enum membership (load only), then
//! date normalization. Later checks index columns the earlier ones proved
//! present and coercible.

use crate::error::{PamError, Result};
use crate::table::backend::TableBackend;
use crate::table::schema::SchemaContract;
use crate::types::{Table, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tracing::debug;

/// Schema-validated wrapper around an underlying read/write primitive
///
/// Loads are safe for concurrent callers; concurrent saves to the same
/// underlying resource must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct ValidatedTableStore<B: TableBackend> {
    contract: SchemaContract,
    backend: B,
}

impl<B: TableBackend> ValidatedTableStore<B> {
    pub fn new(contract: SchemaContract, backend: B) -> Self {
        Self { contract, backend }
    }

    pub fn contract(&self) -> &SchemaContract {
        &self.contract
    }

    /// Load and validate, returning rows projected onto the canonical
    /// column order
    pub fn load(&self) -> Result<Table> {
        let raw = self.backend.load()?;
        debug!(
            "Loaded {} rows from {} backend, validating",
            raw.len(),
            self.backend.name()
        );
        self.validate(raw, true)
    }

    /// Validate and persist
    ///
    /// Enum membership is deliberately not re-checked here: the data
    /// contract enforces it on load only. The asymmetry is part of the
    /// contract, not an omission.
    pub fn save(&self, table: &Table) -> Result<()> {
        let validated = self.validate(table.clone(), false)?;
        self.backend.save(&validated)
    }

    fn validate(&self, mut table: Table, check_enums: bool) -> Result<Table> {
        self.check_column_set(&table)?;
        self.coerce_types(&mut table)?;
        self.check_required(&table)?;
        self.check_uniqueness(&table)?;
        if check_enums {
            self.check_enums(&table)?;
        }
        self.normalize_dates(&mut table)?;
        Ok(table.project(self.contract.columns()))
    }

    /// Step 1: the table's column set must equal the contract's exactly
    fn check_column_set(&self, table: &Table) -> Result<()> {
        let expected: HashSet<&str> = self.contract.columns().iter().map(String::as_str).collect();
        let actual: HashSet<&str> = table.columns().iter().map(String::as_str).collect();

        let mut missing: Vec<String> = expected
            .difference(&actual)
            .map(|c| c.to_string())
            .collect();
        let mut extra: Vec<String> = actual
            .difference(&expected)
            .map(|c| c.to_string())
            .collect();
        missing.sort_unstable();
        extra.sort_unstable();

        match (missing.is_empty(), extra.is_empty()) {
            (true, true) => Ok(()),
            (false, true) => Err(PamError::MissingColumns { missing }),
            (true, false) => Err(PamError::ExtraColumns { extra }),
            (false, false) => Err(PamError::ColumnMismatch { missing, extra }),
        }
    }

    /// Step 2: every cell must coerce to its declared type; coerced values
    /// are kept so downstream output is canonically typed
    fn coerce_types(&self, table: &mut Table) -> Result<()> {
        for column in self.contract.columns() {
            let Some(ty) = self.contract.column_type(column) else {
                continue;
            };
            let col = table.column_index(column).expect("column set checked");
            for row in 0..table.len() {
                let coerced = table.rows()[row][col].coerce_to(ty);
                match coerced {
                    Some(coerced) => table.set_cell(row, col, coerced),
                    None => {
                        return Err(PamError::TypeCoercion {
                            column: column.clone(),
                            value: table.rows()[row][col].render(),
                            expected: ty.name().to_string(),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// Step 3: required columns admit no nulls
    fn check_required(&self, table: &Table) -> Result<()> {
        for column in self.contract.columns() {
            if !self.contract.is_required(column) {
                continue;
            }
            let values = table.column_values(column).expect("column set checked");
            if values.iter().any(|v| v.is_null()) {
                return Err(PamError::NullConstraint {
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    /// Step 4: unique columns admit no duplicates; two nulls count as
    /// duplicates
    fn check_uniqueness(&self, table: &Table) -> Result<()> {
        for column in self.contract.columns() {
            if !self.contract.is_unique(column) {
                continue;
            }
            let values = table.column_values(column).expect("column set checked");
            let mut seen = HashSet::with_capacity(values.len());
            for value in values {
                if !seen.insert(format!("{value:?}")) {
                    return Err(PamError::Uniqueness {
                        column: column.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Step 5 (load only): non-null categorical values must belong to the
    /// declared enum set
    fn check_enums(&self, table: &Table) -> Result<()> {
        for column in self.contract.columns() {
            let Some(allowed) = self.contract.enum_values(column) else {
                continue;
            };
            let allowed_set: HashSet<&str> = allowed.iter().map(String::as_str).collect();
            let values = table.column_values(column).expect("column set checked");

            let mut offending: Vec<String> = values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| v.render())
                .filter(|v| !allowed_set.contains(v.as_str()))
                .collect();

            if !offending.is_empty() {
                offending.sort_unstable();
                offending.dedup();
                return Err(PamError::EnumConstraint {
                    column: column.clone(),
                    values: offending,
                    allowed: allowed.to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Step 6: date-like columns are rewritten to canonical ISO 8601 strings
    fn normalize_dates(&self, table: &mut Table) -> Result<()> {
        for column in self.contract.date_columns() {
            let col = table.column_index(column).expect("column set checked");
            for row in 0..table.len() {
                let cell = &table.rows()[row][col];
                if cell.is_null() {
                    continue;
                }
                let raw = cell.render();
                let iso = parse_date(&raw).ok_or_else(|| PamError::DateParse {
                    column: column.clone(),
                    value: raw.clone(),
                })?;
                table.set_cell(row, col, Value::Str(iso));
            }
        }
        Ok(())
    }
}

/// Datetime formats accepted without an explicit offset
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%b %d %Y %H:%M:%S",
];

/// Date-only formats; midnight is assumed
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d %Y", "%B %d %Y", "%b %d, %Y", "%m/%d/%Y"];

/// Parse a date-like string and render it canonically
///
/// Offset-carrying inputs keep their offset (RFC 3339); naive inputs render
/// as `%Y-%m-%dT%H:%M:%S`. Mixed spellings of the same instant ("2024-01-05",
/// "Jan 5 2024") normalize to identical strings.
fn parse_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_rfc3339());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }
    None
}
