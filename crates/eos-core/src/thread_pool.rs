//! Fixed-size worker pool for embarrassingly parallel batch work.
//!
//! Wraps an owned `rayon` pool. Each submission returns a [`Ticket`] on which
//! the submitter blocks until that job has finished.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::OnceLock;

use crate::config::EngineConfig;
use crate::errors::{EosError, ErrorInfo};

/// Pool of worker threads running queued jobs.
pub struct ThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool {
    /// Spawns `threads` workers (at least one).
    pub fn new(threads: usize) -> Result<Self, EosError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|index| format!("eos-worker-{index}"))
            .build()
            .map_err(|err| {
                EosError::Internal(
                    ErrorInfo::new("eos_core.thread_spawn", err.to_string())
                        .with_context("threads", threads.max(1).to_string()),
                )
            })?;
        tracing::debug!(threads = pool.current_num_threads(), "thread pool started");
        Ok(Self { pool })
    }

    /// Pool sized by [`EngineConfig::effective_threads`].
    pub fn from_config(config: &EngineConfig) -> Result<Self, EosError> {
        Self::new(config.effective_threads())
    }

    /// Process-wide pool sized from the default configuration.
    pub fn global() -> Result<&'static ThreadPool, EosError> {
        static POOL: OnceLock<Result<ThreadPool, EosError>> = OnceLock::new();
        POOL.get_or_init(|| Self::from_config(&EngineConfig::default()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queues `job`; the returned ticket yields its result.
    ///
    /// Jobs already queued still run if the pool is dropped first.
    pub fn enqueue<F, T>(&self, job: F) -> Ticket<T>
    where
        F: FnOnce() -> Result<T, EosError> + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = sync_channel(1);
        self.pool.spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|_| {
                Err(EosError::Internal(ErrorInfo::new(
                    "eos_core.job_panicked",
                    "worker job panicked",
                )))
            });
            // receiver gone: nobody waits for this result
            let _ = sender.send(outcome);
        });
        Ticket { receiver }
    }
}

/// Completion handle for one queued job.
pub struct Ticket<T> {
    receiver: Receiver<Result<T, EosError>>,
}

impl<T> Ticket<T> {
    /// Blocks until the job has run and returns its result.
    pub fn wait(self) -> Result<T, EosError> {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(EosError::Internal(ErrorInfo::new(
                "eos_core.job_lost",
                "worker job finished without a result",
            )))
        })
    }
}
