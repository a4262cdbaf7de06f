//! Metric parameter values
//!
//! Parameters are immutable from construction: a `ParamValue` is built once
//! by the caller and never normalized or rewritten afterwards. Storage is
//! ordered (`BTreeMap`) so selections iterate in a stable name order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One metric parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    /// A frequency band or other (low, high) pair
    Range(f64, f64),
    /// A list of (low, high) pairs, e.g. per-band limits
    Bands(Vec<(f64, f64)>),
}

/// Parameters for one metric, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricParams(BTreeMap<String, ParamValue>);

impl MetricParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn range(&self, key: &str) -> Option<(f64, f64)> {
        match self.0.get(key)? {
            ParamValue::Range(lo, hi) => Some((*lo, *hi)),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn bands(&self, key: &str) -> Option<&[(f64, f64)]> {
        match self.0.get(key)? {
            ParamValue::Bands(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The caller's metric selection: the set of indices computed for each work
/// item is exactly the key set of this map
pub type MetricSelection = BTreeMap<String, MetricParams>;
