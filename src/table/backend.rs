//! Underlying tabular read/write primitives
//!
//! The store is generic over `TableBackend` so the validation layer stays
//! independent of the persisted representation. `CsvBackend` is the shipped
//! implementation; tests add an in-memory one.

use crate::error::{PamError, Result};
use crate::types::{Table, Value};
use std::path::{Path, PathBuf};

/// Underlying read/write primitive wrapped by `ValidatedTableStore`
pub trait TableBackend: Send + Sync {
    /// Read the raw, unvalidated table
    fn load(&self) -> Result<Table>;

    /// Persist the table in the backend's native representation
    fn save(&self, table: &Table) -> Result<()>;

    /// Get the name of this backend (for logging)
    fn name(&self) -> &'static str;
}

/// CSV-file backed table
///
/// Cells are read as strings; empty cells become nulls. Typing is the
/// validation layer's job, not the file format's.
#[derive(Debug, Clone)]
pub struct CsvBackend {
    path: PathBuf,
}

impl CsvBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableBackend for CsvBackend {
    fn load(&self) -> Result<Table> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(PamError::backend)?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(PamError::backend)?
            .iter()
            .map(str::to_owned)
            .collect();

        let mut table = Table::new(columns);
        for record in reader.records() {
            let record = record.map_err(PamError::backend)?;
            let row = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::Str(cell.to_owned())
                    }
                })
                .collect();
            table.push_row(row);
        }

        Ok(table)
    }

    fn save(&self, table: &Table) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path).map_err(PamError::backend)?;

        writer
            .write_record(table.columns())
            .map_err(PamError::backend)?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(Value::render))
                .map_err(PamError::backend)?;
        }
        writer.flush()?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
