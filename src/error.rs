//! Unified error types for pamflow-core
//!
//! Error strategy:
//! - Per-item errors (decode, preprocessing, metric computation): recoverable,
//!   logged and dropped by the executor, batch continues
//! - Contract violations (schema, types, nulls, uniqueness, enums): fatal to
//!   the current load/save call, no lenient mode
//! - Configuration errors (bad worker count, bad contract): fatal before any
//!   work starts

use thiserror::Error;

/// Top-level error type for pamflow-core operations
#[derive(Debug, Error)]
pub enum PamError {
    // =========================================================================
    // Schema contract violations - fatal to the current load/save call
    // =========================================================================
    #[error("Missing columns for the declared table format: {}", format_columns(.missing))]
    MissingColumns { missing: Vec<String> },

    #[error("Extra columns not part of the declared table format: {}", format_columns(.extra))]
    ExtraColumns { extra: Vec<String> },

    #[error("Column mismatch: missing {} and extra {}", format_columns(.missing), format_columns(.extra))]
    ColumnMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("Cannot coerce value '{value}' in column '{column}' to {expected}")]
    TypeCoercion {
        column: String,
        value: String,
        expected: String,
    },

    #[error("Mandatory column '{column}' contains null values")]
    NullConstraint { column: String },

    #[error("Column '{column}' has duplicate values but should be unique")]
    Uniqueness { column: String },

    #[error("Values {} are not allowed for column '{column}'; expected one of {}", format_columns(.values), format_columns(.allowed))]
    EnumConstraint {
        column: String,
        values: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("Cannot parse '{value}' in date column '{column}' as a date")]
    DateParse { column: String, value: String },

    // =========================================================================
    // Batch-fatal errors - abort before any unit of work runs
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    Config(String),

    // =========================================================================
    // Recoverable per-item error - logged and dropped, batch continues
    // =========================================================================
    #[error("Error processing file {media_id}: {reason}")]
    Processing { media_id: String, reason: String },

    // =========================================================================
    // Underlying primitive failures
    // =========================================================================
    #[error("Table backend error: {reason}")]
    Backend { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pamflow-core operations
pub type Result<T> = std::result::Result<T, PamError>;

impl PamError {
    /// Returns true if this error is recoverable (skip item, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PamError::Processing { .. })
    }

    /// Create a per-item processing failure tagged with its identifier
    pub fn processing(media_id: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        PamError::Processing {
            media_id: media_id.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a backend error from anything displayable
    pub fn backend(reason: impl std::fmt::Display) -> Self {
        PamError::Backend {
            reason: reason.to_string(),
        }
    }
}

fn format_columns(cols: &[String]) -> String {
    format!("{{{}}}", cols.join(", "))
}
