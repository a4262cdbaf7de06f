//! Core data types for pamflow-core
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Tabular primitives
// =============================================================================

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the cell the way the CSV backend writes it
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
        }
    }

    /// Attempt coercion to the declared column type
    ///
    /// Nulls pass through untouched; nullability is the required-column
    /// check's concern, not the type check's.
    pub fn coerce_to(&self, ty: ColumnType) -> Option<Value> {
        match (self, ty) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Bool(b), ColumnType::Bool) => Some(Value::Bool(*b)),
            (Value::Int(i), ColumnType::Int) => Some(Value::Int(*i)),
            (Value::Int(i), ColumnType::Float) => Some(Value::Float(*i as f64)),
            (Value::Float(f), ColumnType::Float) => Some(Value::Float(*f)),
            // Upper bound is exclusive: i64::MAX as f64 rounds up to 2^63,
            // which is not representable and would saturate in the cast
            (Value::Float(f), ColumnType::Int)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(Value::Int(*f as i64))
            }
            (v, ColumnType::Str) => Some(Value::Str(v.render())),
            (Value::Str(s), ColumnType::Bool) => match s.trim().to_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            (Value::Str(s), ColumnType::Int) => s.trim().parse().ok().map(Value::Int),
            (Value::Str(s), ColumnType::Float) => s.trim().parse().ok().map(Value::Float),
            _ => None,
        }
    }
}

/// Declared type of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Str,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Str => "str",
        }
    }
}

/// An in-memory table: ordered column names plus rows of cells
///
/// Rows always have exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row; the cell count must match the column count
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Get a cell by row index and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of one column, in row order
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Replace a cell in place
    pub fn set_cell(&mut self, row: usize, col: usize, value: Value) {
        self.rows[row][col] = value;
    }

    /// Project the table onto the given column order
    ///
    /// Crate-internal: every requested column must exist, and the store
    /// checks the column set before calling this.
    pub(crate) fn project(&self, order: &[String]) -> Table {
        let indices: Vec<usize> = order
            .iter()
            .map(|c| self.column_index(c).expect("projection onto known columns"))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|r| indices.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Table {
            columns: order.to_vec(),
            rows,
        }
    }
}

// =============================================================================
// Units of work
// =============================================================================

/// One audio file locator plus its identifier, processed independently
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Path to the raw audio file
    pub path: PathBuf,
    /// Caller-supplied identifier used to correlate results
    pub media_id: String,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>, media_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            media_id: media_id.into(),
        }
    }
}

// =============================================================================
// Signal types
// =============================================================================

/// Amplitude spectrogram with its time and frequency axes
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Amplitude matrix, one inner vector per frequency bin
    pub sxx: Vec<Vec<f64>>,
    /// Time axis in seconds, one entry per frame
    pub tn: Vec<f64>,
    /// Frequency axis in Hz, one entry per bin
    pub fn_: Vec<f64>,
}

impl Spectrogram {
    /// Number of frequency bins
    pub fn bins(&self) -> usize {
        self.sxx.len()
    }

    /// Number of time frames
    pub fn frames(&self) -> usize {
        self.sxx.first().map_or(0, |row| row.len())
    }
}

/// Normalized waveform and spectrogram derived from one raw file
///
/// Owned exclusively by one worker and discarded after metric computation.
#[derive(Debug, Clone)]
pub struct PreprocessedSignal {
    /// Resampled (and optionally filtered) mono waveform
    pub samples: Vec<f64>,
    /// Sample rate of `samples` after resampling, in Hz
    pub sample_rate: u32,
    /// Amplitude spectrogram with axes
    pub spectrogram: Spectrogram,
}

// =============================================================================
// Metric results
// =============================================================================

/// A single computed descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl MetricValue {
    /// Scalar view; vectors have no scalar rendering
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::Vector(_) => None,
        }
    }

    /// Cell rendering for the aggregated result table
    pub fn to_cell(&self) -> Value {
        match self {
            MetricValue::Scalar(v) => Value::Float(*v),
            MetricValue::Vector(v) => Value::Str(
                v.iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(";"),
            ),
        }
    }
}

/// Named descriptor set computed for one work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Identifier of the work item this result belongs to
    pub media_id: String,
    /// Metric name to computed value, in stable name order
    pub values: BTreeMap<String, MetricValue>,
}

impl MetricResult {
    pub fn new(media_id: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            values: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_string_to_numeric() {
        assert_eq!(
            Value::Str("42".into()).coerce_to(ColumnType::Int),
            Some(Value::Int(42))
        );
        assert_eq!(
            Value::Str("1.5".into()).coerce_to(ColumnType::Float),
            Some(Value::Float(1.5))
        );
        assert_eq!(Value::Str("abc".into()).coerce_to(ColumnType::Int), None);
    }

    #[test]
    fn test_integral_float_coerces_to_int_within_range() {
        assert_eq!(
            Value::Float(3.0).coerce_to(ColumnType::Int),
            Some(Value::Int(3))
        );
        assert_eq!(Value::Float(3.5).coerce_to(ColumnType::Int), None);
        // fract() is 0.0 out here, but the value does not fit in i64
        assert_eq!(Value::Float(9.3e18).coerce_to(ColumnType::Int), None);
        assert_eq!(Value::Float(-9.3e18).coerce_to(ColumnType::Int), None);
    }

    #[test]
    fn test_null_passes_any_type() {
        for ty in [
            ColumnType::Bool,
            ColumnType::Int,
            ColumnType::Float,
            ColumnType::Str,
        ] {
            assert_eq!(Value::Null.coerce_to(ty), Some(Value::Null));
        }
    }

    #[test]
    fn test_table_projection_reorders() {
        let mut t = Table::new(vec!["b".into(), "a".into()]);
        t.push_row(vec![Value::Int(2), Value::Int(1)]);
        let p = t.project(&["a".into(), "b".into()]);
        assert_eq!(p.columns(), ["a", "b"]);
        assert_eq!(p.rows()[0], vec![Value::Int(1), Value::Int(2)]);
    }
}
