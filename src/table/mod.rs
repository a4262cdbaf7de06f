//! Schema-validated tabular storage
//!
//! `SchemaContract` declares the expected table shape; `ValidatedTableStore`
//! wraps an underlying `TableBackend` and enforces the contract on every
//! load and save.

pub mod backend;
pub mod schema;
pub mod store;

pub use backend::{CsvBackend, TableBackend};
pub use schema::{SchemaContract, SchemaContractBuilder};
pub use store::ValidatedTableStore;
