//! Audio preprocessing stage
//!
//! Converts one raw input file into a normalized signal plus spectrogram:
//! decode, resample to the target rate, optionally filter, then transform.
//! The actual DSP is delegated to the `SignalBackend`; this stage owns only
//! sequencing and configuration.

use crate::dsp::{BandpassConfig, SignalBackend, SpectrogramConfig};
use crate::error::Result;
use crate::types::PreprocessedSignal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Preprocessing parameters shared by every work item in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Sample rate every waveform is resampled to, in Hz
    pub target_sample_rate: u32,
    /// Optional filter applied after resampling
    pub filter: Option<BandpassConfig>,
    /// Spectrogram window parameters
    pub spectrogram: SpectrogramConfig,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 48_000,
            filter: None,
            spectrogram: SpectrogramConfig::default(),
        }
    }
}

/// Sequencing wrapper turning one raw file into a `PreprocessedSignal`
#[derive(Debug, Clone)]
pub struct PreprocessingStage {
    config: PreprocessConfig,
}

impl PreprocessingStage {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Decode, resample, optionally filter, and transform one file
    pub fn run(&self, backend: &dyn SignalBackend, path: &Path) -> Result<PreprocessedSignal> {
        debug!("Preprocessing {} with {} backend", path.display(), backend.name());

        let (samples, native_rate) = backend.load(path)?;
        let target = self.config.target_sample_rate;

        let samples = if native_rate == target {
            samples
        } else {
            backend.resample(&samples, native_rate, target)?
        };

        let samples = match &self.config.filter {
            Some(filter) => backend.filter(&samples, target, filter)?,
            None => samples,
        };

        let spectrogram = backend.spectrogram(&samples, target, &self.config.spectrogram)?;

        Ok(PreprocessedSignal {
            samples,
            sample_rate: target,
            spectrogram,
        })
    }
}
