//! Signal-processing trait abstractions
//!
//! `SignalBackend` is the seam to the external signal-processing capability:
//! decoding, resampling, filtering, the spectrogram transform, and the scalar
//! statistics the acoustic indices consume. The crate owns sequencing and
//! configuration only; no DSP implementation ships here.

use crate::error::Result;
use crate::metrics::params::MetricParams;
use crate::types::Spectrogram;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frequency-selective filter families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

/// Optional filter applied after resampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandpassConfig {
    pub kind: FilterKind,
    /// Low and high cutoff in Hz; one-sided kinds use the relevant edge
    pub cutoff_hz: (f64, f64),
    /// Filter order
    pub order: u32,
}

/// Short-time transform parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrogramConfig {
    /// Window length in samples
    pub nperseg: usize,
    /// Overlap between consecutive windows in samples
    pub noverlap: usize,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            nperseg: 1024,
            noverlap: 512,
        }
    }
}

/// Signal-processing backend
///
/// Implementations wrap whatever DSP library the embedding application uses.
/// All methods are called from worker threads, hence `Send + Sync`.
pub trait SignalBackend: Send + Sync {
    /// Decode an audio file into a mono waveform and its native sample rate
    fn load(&self, path: &Path) -> Result<(Vec<f64>, u32)>;

    /// Resample a waveform between sample rates
    fn resample(&self, samples: &[f64], from_hz: u32, to_hz: u32) -> Result<Vec<f64>>;

    /// Apply a frequency-selective filter
    fn filter(&self, samples: &[f64], sample_rate: u32, config: &BandpassConfig)
        -> Result<Vec<f64>>;

    /// Amplitude spectrogram with time and frequency axes
    fn spectrogram(
        &self,
        samples: &[f64],
        sample_rate: u32,
        config: &SpectrogramConfig,
    ) -> Result<Spectrogram>;

    /// Convert an amplitude matrix to decibels
    fn amplitude_to_db(&self, sxx: &[Vec<f64>]) -> Vec<Vec<f64>>;

    // =========================================================================
    // Scalar statistics consumed by individual metrics
    // =========================================================================

    /// Root-mean-square of the waveform
    fn rms(&self, samples: &[f64]) -> f64;

    /// Temporal entropy of the waveform envelope
    fn temporal_entropy(&self, samples: &[f64]) -> f64;

    /// Spectral (frequency) entropy of a power spectrogram
    fn spectral_entropy(&self, sxx_power: &[Vec<f64>]) -> f64;

    /// Acoustic complexity over an amplitude spectrogram
    fn acoustic_complexity(&self, sxx: &[Vec<f64>]) -> f64;

    /// Diversity/evenness index over an amplitude spectrogram
    fn diversity_index(&self, sxx: &[Vec<f64>], fn_: &[f64], params: &MetricParams) -> Result<f64>;

    /// Bioacoustics index over an amplitude spectrogram
    fn bioacoustics_index(
        &self,
        sxx: &[Vec<f64>],
        fn_: &[f64],
        params: &MetricParams,
    ) -> Result<f64>;

    /// Normalized difference soundscape index over a power spectrogram
    fn soundscape_index(
        &self,
        sxx_power: &[Vec<f64>],
        fn_: &[f64],
        params: &MetricParams,
    ) -> Result<f64>;

    /// Count of spectral peaks in a power spectrogram
    fn peak_count(&self, sxx_power: &[Vec<f64>], fn_: &[f64], params: &MetricParams)
        -> Result<f64>;

    /// Fraction of a decibel spectrogram above a threshold, per band
    fn spectral_cover(
        &self,
        sxx_db: &[Vec<f64>],
        fn_: &[f64],
        params: &MetricParams,
    ) -> Result<f64>;

    /// Get the name of this backend (for logging)
    fn name(&self) -> &'static str;
}
