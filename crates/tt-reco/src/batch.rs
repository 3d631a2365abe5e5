//! Reconstruction of many events in parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use tt_core::errors::RecoError;

use crate::config::RecoConfig;
use crate::event::Event;
use crate::reconstruct::Reconstructor;
use crate::result::ReconstructionResult;
use crate::status::ReconstructionStatus;

/// Reconstructs `events` on `threads` workers; results keep the input order.
pub fn reconstruct_batch(
    config: &RecoConfig,
    events: &[Event],
    threads: usize,
) -> Result<Vec<ReconstructionResult>, RecoError> {
    let prototype = Reconstructor::from_config(config)?;
    reconstruct_with(&prototype, events, threads)
}

/// Reconstructs `events` with clones of `prototype`, one per worker.
pub fn reconstruct_with(
    prototype: &Reconstructor,
    events: &[Event],
    threads: usize,
) -> Result<Vec<ReconstructionResult>, RecoError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|err| RecoError::config("thread_pool", err.to_string()))?;
    let results: Result<Vec<_>, RecoError> = pool.install(|| {
        events
            .par_iter()
            .map_init(
                || prototype.clone(),
                |reconstructor, event| reconstructor.process(&event.view()),
            )
            .collect()
    });
    let results = results?;
    info!(
        events = results.len(),
        threads = threads.max(1),
        "batch reconstructed"
    );
    Ok(results)
}

/// Run-level summary of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Stable hash of the configuration.
    pub config_hash: String,
    /// Number of events processed.
    pub events: usize,
    /// Number of events per status name.
    pub status_counts: BTreeMap<String, usize>,
}

impl BatchSummary {
    /// Tallies statuses of `results`.
    pub fn new(config: &RecoConfig, results: &[ReconstructionResult]) -> Result<Self, RecoError> {
        let mut status_counts = BTreeMap::new();
        for result in results {
            *status_counts
                .entry(result.status().name().to_string())
                .or_insert(0) += 1;
        }
        Ok(Self {
            config_hash: config.stable_hash()?,
            events: results.len(),
            status_counts,
        })
    }

    /// Fraction of successfully reconstructed events.
    pub fn efficiency(&self) -> f64 {
        if self.events == 0 {
            return 0.0;
        }
        let success = self
            .status_counts
            .get(ReconstructionStatus::Success.name())
            .copied()
            .unwrap_or(0);
        success as f64 / self.events as f64
    }
}
