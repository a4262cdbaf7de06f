//! pamflow-core - Passive Acoustic Monitoring Data Core
//!
//! The two load-bearing subsystems of a passive-acoustic-monitoring data
//! tool: a schema-validated table store enforcing a declarative contract on
//! every read and write of tabular metadata, and a parallel feature engine
//! computing configurable acoustic indices over large audio collections
//! with per-file failure isolation.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `table`: schema contracts and the validated table store
//! - `dsp`: the signal-processing backend seam (decode, spectrogram, stats)
//! - `preprocess`: per-file decode/resample/filter/transform sequencing
//! - `metrics`: the acoustic index catalog and parameter types
//! - `pipeline`: parallel batch execution and result aggregation
//!
//! # Example
//!
//! ```no_run
//! use pamflow_core::pipeline::{self, BatchConfig};
//! use pamflow_core::table::{CsvBackend, SchemaContract, ValidatedTableStore};
//! use pamflow_core::types::ColumnType;
//!
//! # fn demo(backend: &dyn pamflow_core::dsp::SignalBackend) -> pamflow_core::Result<()> {
//! let contract = SchemaContract::builder(["mediaID", "filePath", "timestamp"])
//!     .column_type("mediaID", ColumnType::Str)
//!     .required("mediaID")
//!     .unique("mediaID")
//!     .date_column("timestamp")
//!     .build()?;
//! let store = ValidatedTableStore::new(contract, CsvBackend::new("media.csv"));
//!
//! let media = store.load()?;
//! let items = pipeline::work_items(&media, "filePath", "mediaID")?;
//! let (results, stats) = pipeline::run_batch(backend, &items, &BatchConfig::default())?;
//! let indices = pipeline::aggregate_results(&results, "mediaID");
//! println!("Computed indices for {} of {} files", stats.successful, stats.total);
//! # Ok(())
//! # }
//! ```

pub mod dsp;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod table;
pub mod types;

// Re-export key types at crate root
pub use error::{PamError, Result};
pub use types::{MetricResult, MetricValue, PreprocessedSignal, Table, Value, WorkItem};
