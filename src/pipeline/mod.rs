//! Parallel batch execution and result aggregation

pub mod aggregate;
pub mod executor;

pub use aggregate::{aggregate_results, work_items};
pub use executor::{run_batch, BatchConfig, BatchStats, WorkerCount};
