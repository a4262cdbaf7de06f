//! Parallel batch executor
//!
//! Fans preprocessing plus metric computation out across a worker pool, one
//! fully independent unit per work item. A failing unit is caught, logged
//! with its identifier, and dropped; it never aborts sibling in-flight or
//! queued work. Only a bad configuration or pool-creation failure aborts
//! the whole batch, and both happen before any unit starts.

use crate::dsp::SignalBackend;
use crate::error::{PamError, Result};
use crate::metrics::params::MetricSelection;
use crate::metrics::registry::MetricRegistry;
use crate::preprocess::{PreprocessConfig, PreprocessingStage};
use crate::types::{MetricResult, WorkItem};
use crossbeam_channel::unbounded;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info};

/// Worker-count request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerCount {
    /// Use all host-detected parallelism
    Auto,
    /// Use exactly this many workers; must be at least 1
    Fixed(usize),
}

impl WorkerCount {
    /// Interpret a raw numeric request: -1 is the "all available" sentinel,
    /// positive values are explicit counts, anything else is rejected
    pub fn from_request(request: i64) -> Result<Self> {
        match request {
            -1 => Ok(WorkerCount::Auto),
            n if n >= 1 => Ok(WorkerCount::Fixed(n as usize)),
            n => Err(PamError::Config(format!(
                "worker count must be a positive integer or -1 for all cores, got {n}"
            ))),
        }
    }

    /// Resolve to a concrete worker count, validating explicit requests
    pub fn resolve(self) -> Result<usize> {
        match self {
            WorkerCount::Auto => Ok(num_cpus::get().max(1)),
            WorkerCount::Fixed(0) => Err(PamError::Config(
                "worker count must be a positive integer or -1 for all cores, got 0".into(),
            )),
            WorkerCount::Fixed(n) => Ok(n),
        }
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        WorkerCount::Fixed(1)
    }
}

/// Configuration for one batch call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Preprocessing applied to every work item
    pub preprocess: PreprocessConfig,
    /// The indices to compute and their parameters
    pub selection: MetricSelection,
    /// Worker-count request
    pub workers: WorkerCount,
    /// Show a progress bar while the batch runs
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            selection: MetricSelection::new(),
            workers: WorkerCount::default(),
            show_progress: false,
        }
    }
}

/// Batch outcome counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Run preprocessing and metric computation for every work item
///
/// Blocks until every submitted unit has either produced a result or been
/// recorded failed. Results arrive in completion order; callers correlate
/// by identifier, never by position. The worker pool is created here and
/// torn down before returning.
pub fn run_batch(
    backend: &dyn SignalBackend,
    items: &[WorkItem],
    config: &BatchConfig,
) -> Result<(Vec<MetricResult>, BatchStats)> {
    let workers = config.workers.resolve()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PamError::Config(format!("Failed to build worker pool: {e}")))?;

    info!(
        "Computing {} metrics for {} files on {} workers",
        config.selection.len(),
        items.len(),
        workers
    );

    let registry = MetricRegistry::new();
    let stage = PreprocessingStage::new(config.preprocess.clone());

    let progress_bar = if config.show_progress {
        let pb = ProgressBar::new(items.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let failed = AtomicUsize::new(0);

    // Unbounded so workers never block on send while the main thread waits
    // for the pool to drain; the receiver is only read after install returns.
    let (result_tx, result_rx) = unbounded::<MetricResult>();

    pool.install(|| {
        items.par_iter().for_each_with(result_tx, |tx, item| {
            match process_item(backend, &stage, &registry, &config.selection, item) {
                Ok(result) => {
                    // Receiver outlives the pool, send cannot fail here
                    let _ = tx.send(result);
                }
                Err(e) => {
                    // Display already carries the item's identifier
                    error!("{e}");
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        });
    });

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Batch complete");
    }

    // All senders dropped once install returns; this drains in completion order
    let results: Vec<MetricResult> = result_rx.into_iter().collect();

    let stats = BatchStats {
        total: items.len(),
        successful: results.len(),
        failed: failed.load(Ordering::Relaxed),
    };
    info!(
        "Batch finished: {} successful, {} failed (of {} total)",
        stats.successful, stats.failed, stats.total
    );

    Ok((results, stats))
}

/// Process one work item end to end
///
/// Any failure in here is tagged with the item's identifier and surfaces as
/// a recoverable per-item error.
fn process_item(
    backend: &dyn SignalBackend,
    stage: &PreprocessingStage,
    registry: &MetricRegistry,
    selection: &MetricSelection,
    item: &WorkItem,
) -> Result<MetricResult> {
    debug!("Processing file {}", item.path.display());

    let signal = stage
        .run(backend, &item.path)
        .map_err(|e| PamError::processing(&item.media_id, e))?;

    let values = registry
        .compute_selected(backend, &signal, selection)
        .map_err(|e| PamError::processing(&item.media_id, e))?;

    Ok(MetricResult {
        media_id: item.media_id.clone(),
        values,
    })
}
