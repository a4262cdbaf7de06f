//! Shared test fixtures: a deterministic, WAV-free signal backend
//!
//! The synthetic backend derives a waveform from the raw bytes of the input
//! file, so tests control outcomes entirely through the filesystem: a
//! missing or empty file fails exactly where a real decoder would.

use pamflow_core::dsp::{BandpassConfig, SignalBackend, SpectrogramConfig};
use pamflow_core::error::{PamError, Result};
use pamflow_core::metrics::MetricParams;
use pamflow_core::types::Spectrogram;
use std::path::Path;

pub struct SyntheticBackend;

impl SignalBackend for SyntheticBackend {
    fn load(&self, path: &Path) -> Result<(Vec<f64>, u32)> {
        let bytes = std::fs::read(path)?;
        if bytes.is_empty() {
            return Err(PamError::backend(format!(
                "no audio frames in {}",
                path.display()
            )));
        }
        let samples = bytes
            .iter()
            .cycle()
            .take(2048)
            .map(|&b| b as f64 / 255.0 - 0.5)
            .collect();
        Ok((samples, 44_100))
    }

    fn resample(&self, samples: &[f64], _from_hz: u32, _to_hz: u32) -> Result<Vec<f64>> {
        Ok(samples.to_vec())
    }

    fn filter(
        &self,
        samples: &[f64],
        _sample_rate: u32,
        _config: &BandpassConfig,
    ) -> Result<Vec<f64>> {
        Ok(samples.to_vec())
    }

    fn spectrogram(
        &self,
        samples: &[f64],
        sample_rate: u32,
        config: &SpectrogramConfig,
    ) -> Result<Spectrogram> {
        let frames = (samples.len() / config.nperseg).max(1);
        let bins = 4;
        let sxx = (0..bins)
            .map(|bin| {
                (0..frames)
                    .map(|frame| {
                        let idx = (bin * frames + frame) % samples.len();
                        samples[idx].abs() + 1e-6
                    })
                    .collect()
            })
            .collect();
        let tn = (0..frames)
            .map(|f| f as f64 * config.nperseg as f64 / sample_rate as f64)
            .collect();
        let fn_ = (0..bins)
            .map(|b| b as f64 * sample_rate as f64 / (2.0 * bins as f64))
            .collect();
        Ok(Spectrogram { sxx, tn, fn_ })
    }

    fn amplitude_to_db(&self, sxx: &[Vec<f64>]) -> Vec<Vec<f64>> {
        sxx.iter()
            .map(|row| row.iter().map(|v| 20.0 * v.max(1e-12).log10()).collect())
            .collect()
    }

    fn rms(&self, samples: &[f64]) -> f64 {
        let sum_sq: f64 = samples.iter().map(|s| s * s).sum();
        (sum_sq / samples.len().max(1) as f64).sqrt()
    }

    fn temporal_entropy(&self, samples: &[f64]) -> f64 {
        let total: f64 = samples.iter().map(|s| s.abs()).sum();
        if total == 0.0 {
            return 0.0;
        }
        let n = samples.len() as f64;
        let entropy: f64 = samples
            .iter()
            .map(|s| s.abs() / total)
            .filter(|p| *p > 0.0)
            .map(|p| -p * p.log2())
            .sum();
        entropy / n.log2()
    }

    fn spectral_entropy(&self, sxx_power: &[Vec<f64>]) -> f64 {
        let total: f64 = sxx_power.iter().flatten().sum();
        if total == 0.0 {
            return 0.0;
        }
        let n = sxx_power.iter().map(|row| row.len()).sum::<usize>() as f64;
        let entropy: f64 = sxx_power
            .iter()
            .flatten()
            .map(|v| v / total)
            .filter(|p| *p > 0.0)
            .map(|p| -p * p.log2())
            .sum();
        entropy / n.log2()
    }

    fn acoustic_complexity(&self, sxx: &[Vec<f64>]) -> f64 {
        sxx.iter()
            .map(|row| {
                let diff: f64 = row.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
                let total: f64 = row.iter().sum();
                if total > 0.0 {
                    diff / total
                } else {
                    0.0
                }
            })
            .sum()
    }

    fn diversity_index(
        &self,
        sxx: &[Vec<f64>],
        _fn_: &[f64],
        params: &MetricParams,
    ) -> Result<f64> {
        // Evenness proxy: fraction of bins whose mean amplitude clears the threshold
        let threshold = 10f64.powf(params.number("db_threshold").unwrap_or(-50.0) / 20.0);
        let active = sxx
            .iter()
            .filter(|row| {
                let mean = row.iter().sum::<f64>() / row.len().max(1) as f64;
                mean > threshold
            })
            .count();
        Ok(active as f64 / sxx.len().max(1) as f64)
    }

    fn bioacoustics_index(
        &self,
        sxx: &[Vec<f64>],
        _fn_: &[f64],
        _params: &MetricParams,
    ) -> Result<f64> {
        Ok(sxx.iter().flatten().sum())
    }

    fn soundscape_index(
        &self,
        sxx_power: &[Vec<f64>],
        _fn_: &[f64],
        _params: &MetricParams,
    ) -> Result<f64> {
        let total: f64 = sxx_power.iter().flatten().sum();
        Ok(total.tanh())
    }

    fn peak_count(
        &self,
        sxx_power: &[Vec<f64>],
        _fn_: &[f64],
        _params: &MetricParams,
    ) -> Result<f64> {
        Ok(sxx_power.first().map_or(0.0, |row| row.len() as f64))
    }

    fn spectral_cover(
        &self,
        sxx_db: &[Vec<f64>],
        _fn_: &[f64],
        params: &MetricParams,
    ) -> Result<f64> {
        let threshold = params.number("db_threshold").unwrap_or(-50.0);
        let total = sxx_db.iter().flatten().count().max(1);
        let above = sxx_db.iter().flatten().filter(|v| **v > threshold).count();
        Ok(above as f64 / total as f64)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}
