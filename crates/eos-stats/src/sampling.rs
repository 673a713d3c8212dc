//! Parallel prior-predictive sampling.
//!
//! Samples are split into fixed-size chunks, one pool job per chunk. Every
//! job builds its own deep copy of the world on the worker and draws from the random
//! stream of its chunk index, so the output depends on the seed alone and
//! not on the number of workers.

use std::sync::Arc;

use eos_core::{EosError, RngHandle, ThreadPool};
use eos_observable::ObservableCache;
use statrs::statistics::Statistics;

use crate::prior::LogPrior;

/// Samples drawn by one pool job.
pub const CHUNK_SIZE: usize = 64;

/// Draws of the priors and the predictions they imply.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorPredictive {
    /// Parameter names, one per prior.
    pub parameters: Vec<String>,
    /// Observable names with their kinematics, in cache id order.
    pub observables: Vec<String>,
    /// Sampled parameter values, one row per sample.
    pub parameter_samples: Vec<Vec<f64>>,
    /// Predicted observable values, one row per sample.
    pub observable_samples: Vec<Vec<f64>>,
}

impl PriorPredictive {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.observable_samples.len()
    }

    /// Whether no samples were drawn.
    pub fn is_empty(&self) -> bool {
        self.observable_samples.is_empty()
    }

    /// Values of observable `index` across samples.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.observable_samples.iter().map(|row| row[index]).collect()
    }

    /// Sample mean of observable `index`.
    pub fn mean(&self, index: usize) -> f64 {
        self.column(index).mean()
    }

    /// Sample standard deviation of observable `index`.
    pub fn std_dev(&self, index: usize) -> f64 {
        self.column(index).std_dev()
    }
}

struct Chunk {
    parameters: Vec<Vec<f64>>,
    observables: Vec<Vec<f64>>,
}

fn run_chunk(mut cache: ObservableCache, priors: Vec<LogPrior>, mut rng: RngHandle, count: usize) -> Result<Chunk, EosError> {
    let mut chunk = Chunk {
        parameters: Vec::with_capacity(count),
        observables: Vec::with_capacity(count),
    };
    for _ in 0..count {
        let mut drawn = Vec::with_capacity(priors.len());
        for prior in &priors {
            drawn.push(prior.sample(&mut rng)?);
        }
        cache.update()?;
        let mut row = Vec::with_capacity(cache.len());
        for (id, _) in cache.iter() {
            row.push(cache.value(id)?);
        }
        chunk.parameters.push(drawn);
        chunk.observables.push(row);
    }
    Ok(chunk)
}

/// Draws `samples` points from `priors` and evaluates every observable of
/// `cache` at each of them.
///
/// `cache` and its world are left untouched.
pub fn prior_predictive(
    cache: &ObservableCache,
    priors: &[LogPrior],
    samples: usize,
    seed: u64,
    pool: &ThreadPool,
) -> Result<PriorPredictive, EosError> {
    let jobs = samples.div_ceil(CHUNK_SIZE);
    tracing::info!(samples, jobs, threads = pool.threads(), seed, "prior-predictive sampling started");

    // Jobs fork from one detached copy so the caller's world is never read
    // from a worker.
    let template = Arc::new(cache.clone_with(&cache.parameters().deep_clone())?);
    let template_priors = Arc::new(priors.to_vec());
    let mut tickets = Vec::with_capacity(jobs);
    for job in 0..jobs {
        let count = CHUNK_SIZE.min(samples - job * CHUNK_SIZE);
        let template = Arc::clone(&template);
        let template_priors = Arc::clone(&template_priors);
        tickets.push(pool.enqueue(move || {
            let world = template.parameters().deep_clone();
            let job_cache = template.clone_with(&world)?;
            let job_priors = template_priors
                .iter()
                .map(|prior| prior.clone_with(&world))
                .collect::<Result<Vec<_>, _>>()?;
            run_chunk(job_cache, job_priors, RngHandle::for_substream(seed, job as u64), count)
        }));
    }

    let mut result = PriorPredictive {
        parameters: priors.iter().map(|prior| prior.parameter().name()).collect(),
        observables: cache
            .iter()
            .map(|(_, observable)| format!("{}[{}]", observable.name(), observable.kinematics().as_string()))
            .collect(),
        parameter_samples: Vec::with_capacity(samples),
        observable_samples: Vec::with_capacity(samples),
    };
    for ticket in tickets {
        let chunk = ticket.wait()?;
        result.parameter_samples.extend(chunk.parameters);
        result.observable_samples.extend(chunk.observables);
    }
    tracing::info!(samples = result.len(), "prior-predictive sampling finished");
    Ok(result)
}
