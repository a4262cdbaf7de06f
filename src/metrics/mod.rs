//! Acoustic index computation
//!
//! `MetricRegistry` maps index names to computation functions; `params`
//! carries the per-index parameter values callers select indices with.

pub mod params;
pub mod registry;

pub use params::{MetricParams, MetricSelection, ParamValue};
pub use registry::{MetricContext, MetricRegistry};
