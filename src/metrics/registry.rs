//! Acoustic index catalog and dispatch
//!
//! The registry is an explicit name-to-function map populated once at
//! construction. Computation is selection-driven: exactly the indices named
//! in the caller's `MetricSelection` are computed, and a requested name the
//! catalog does not know is logged and skipped rather than failing the item.

use crate::dsp::SignalBackend;
use crate::error::Result;
use crate::metrics::params::{MetricParams, MetricSelection};
use crate::types::{MetricValue, PreprocessedSignal};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Per-item computation context
///
/// Holds the preprocessed signal plus the spectrogram scalings several
/// indices share. The power and decibel conversions are computed exactly
/// once per item here, never once per metric.
pub struct MetricContext<'a> {
    backend: &'a dyn SignalBackend,
    signal: &'a PreprocessedSignal,
    sxx_power: Vec<Vec<f64>>,
    sxx_db: Vec<Vec<f64>>,
}

impl<'a> MetricContext<'a> {
    pub fn new(backend: &'a dyn SignalBackend, signal: &'a PreprocessedSignal) -> Self {
        let sxx = &signal.spectrogram.sxx;
        let sxx_power = sxx
            .iter()
            .map(|row| row.iter().map(|v| v * v).collect())
            .collect();
        let sxx_db = backend.amplitude_to_db(sxx);
        Self {
            backend,
            signal,
            sxx_power,
            sxx_db,
        }
    }

    pub fn signal(&self) -> &PreprocessedSignal {
        self.signal
    }
}

type MetricFn = fn(&MetricContext, &MetricParams) -> Result<MetricValue>;

/// Fixed catalog of named acoustic indices
pub struct MetricRegistry {
    catalog: HashMap<&'static str, MetricFn>,
}

impl MetricRegistry {
    /// Build the catalog; the name set is fixed for the registry's lifetime
    pub fn new() -> Self {
        let mut catalog: HashMap<&'static str, MetricFn> = HashMap::new();
        catalog.insert("ACI", compute_aci);
        catalog.insert("ADI", compute_adi);
        catalog.insert("BI", compute_bi);
        catalog.insert("Hf", compute_hf);
        catalog.insert("Ht", compute_ht);
        catalog.insert("H", compute_h);
        catalog.insert("NDSI", compute_ndsi);
        catalog.insert("NP", compute_np);
        catalog.insert("RMS", compute_rms);
        catalog.insert("SC", compute_sc);
        Self { catalog }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.catalog.contains_key(name)
    }

    /// Catalog names in stable order
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.catalog.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Compute exactly the indices the selection names
    ///
    /// Unknown names are skipped with a warning; a failing index fails the
    /// whole item (the executor handles that as a per-item failure).
    pub fn compute_selected(
        &self,
        backend: &dyn SignalBackend,
        signal: &PreprocessedSignal,
        selection: &MetricSelection,
    ) -> Result<BTreeMap<String, MetricValue>> {
        let ctx = MetricContext::new(backend, signal);

        let mut results = BTreeMap::new();
        for (name, params) in selection {
            match self.catalog.get(name.as_str()) {
                Some(metric) => {
                    results.insert(name.clone(), metric(&ctx, params)?);
                }
                None => {
                    warn!("Requested metric '{}' is not in the catalog, skipping", name);
                }
            }
        }
        Ok(results)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Index computations
// =============================================================================

/// Acoustic Complexity Index (ACI)
fn compute_aci(ctx: &MetricContext, _params: &MetricParams) -> Result<MetricValue> {
    Ok(MetricValue::Scalar(
        ctx.backend.acoustic_complexity(&ctx.signal.spectrogram.sxx),
    ))
}

/// Acoustic Diversity Index (ADI)
fn compute_adi(ctx: &MetricContext, params: &MetricParams) -> Result<MetricValue> {
    let value =
        ctx.backend
            .diversity_index(&ctx.signal.spectrogram.sxx, &ctx.signal.spectrogram.fn_, params)?;
    Ok(MetricValue::Scalar(value))
}

/// Bioacoustics Index (BI)
fn compute_bi(ctx: &MetricContext, params: &MetricParams) -> Result<MetricValue> {
    let value = ctx.backend.bioacoustics_index(
        &ctx.signal.spectrogram.sxx,
        &ctx.signal.spectrogram.fn_,
        params,
    )?;
    Ok(MetricValue::Scalar(value))
}

/// Frequency Entropy (Hf), over the shared power spectrogram
fn compute_hf(ctx: &MetricContext, _params: &MetricParams) -> Result<MetricValue> {
    Ok(MetricValue::Scalar(ctx.backend.spectral_entropy(&ctx.sxx_power)))
}

/// Temporal Entropy (Ht), over the waveform
fn compute_ht(ctx: &MetricContext, _params: &MetricParams) -> Result<MetricValue> {
    Ok(MetricValue::Scalar(
        ctx.backend.temporal_entropy(&ctx.signal.samples),
    ))
}

/// Acoustic Entropy (H)
///
/// Defined as the product of two independently computable indices,
/// H = Hf * Ht. The dependency is explicit: this calls the same functions
/// that back the "Hf" and "Ht" catalog entries.
fn compute_h(ctx: &MetricContext, params: &MetricParams) -> Result<MetricValue> {
    let hf = compute_hf(ctx, params)?.as_scalar().unwrap_or(f64::NAN);
    let ht = compute_ht(ctx, params)?.as_scalar().unwrap_or(f64::NAN);
    Ok(MetricValue::Scalar(hf * ht))
}

/// Normalized Difference Soundscape Index (NDSI), over the shared power
/// spectrogram
fn compute_ndsi(ctx: &MetricContext, params: &MetricParams) -> Result<MetricValue> {
    let value =
        ctx.backend
            .soundscape_index(&ctx.sxx_power, &ctx.signal.spectrogram.fn_, params)?;
    Ok(MetricValue::Scalar(value))
}

/// Number of Peaks (NP), over the shared power spectrogram
fn compute_np(ctx: &MetricContext, params: &MetricParams) -> Result<MetricValue> {
    let value = ctx
        .backend
        .peak_count(&ctx.sxx_power, &ctx.signal.spectrogram.fn_, params)?;
    Ok(MetricValue::Scalar(value))
}

/// Root Mean Square (RMS), over the waveform
fn compute_rms(ctx: &MetricContext, _params: &MetricParams) -> Result<MetricValue> {
    Ok(MetricValue::Scalar(ctx.backend.rms(&ctx.signal.samples)))
}

/// Spectral Cover (SC), over the shared decibel spectrogram
fn compute_sc(ctx: &MetricContext, params: &MetricParams) -> Result<MetricValue> {
    let value = ctx
        .backend
        .spectral_cover(&ctx.sxx_db, &ctx.signal.spectrogram.fn_, params)?;
    Ok(MetricValue::Scalar(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names() {
        let registry = MetricRegistry::new();
        assert_eq!(
            registry.names(),
            ["ACI", "ADI", "BI", "H", "Hf", "Ht", "NDSI", "NP", "RMS", "SC"]
        );
        assert!(registry.contains("RMS"));
        assert!(!registry.contains("XYZ"));
    }
}
