use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eos_core::{EosError, ErrorInfo, ErrorKind, ThreadPool};

#[test]
fn tickets_return_job_results() -> Result<(), EosError> {
    let pool = ThreadPool::new(3)?;
    let tickets: Vec<_> = (0..32u64).map(|i| pool.enqueue(move || Ok(i * i))).collect();
    let results: Vec<u64> = tickets
        .into_iter()
        .map(|ticket| ticket.wait())
        .collect::<Result<_, _>>()?;
    assert_eq!(results, (0..32u64).map(|i| i * i).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn job_errors_and_panics_reach_the_ticket() -> Result<(), EosError> {
    let pool = ThreadPool::new(2)?;
    let failing = pool.enqueue(|| -> Result<(), EosError> {
        Err(EosError::Numeric(ErrorInfo::new("test.failure", "boom")))
    });
    let panicking = pool.enqueue(|| -> Result<(), EosError> { panic!("worker panic") });
    assert_eq!(failing.wait().unwrap_err().kind(), ErrorKind::Numeric);
    assert_eq!(panicking.wait().unwrap_err().code(), "eos_core.job_panicked");

    let after = pool.enqueue(|| Ok(7));
    assert_eq!(after.wait()?, 7);
    Ok(())
}

#[test]
fn queued_jobs_outlive_the_pool() -> Result<(), EosError> {
    let counter = Arc::new(AtomicUsize::new(0));
    let tickets: Vec<_> = {
        let pool = ThreadPool::new(1)?;
        (0..16)
            .map(|_| {
                let counter = Arc::clone(&counter);
                pool.enqueue(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect()
    };
    for ticket in tickets {
        ticket.wait()?;
    }
    assert_eq!(counter.load(Ordering::SeqCst), 16);
    Ok(())
}

#[test]
fn pool_runs_the_requested_number_of_workers() -> Result<(), EosError> {
    let pool = ThreadPool::new(3)?;
    assert_eq!(pool.threads(), 3);
    let names: Vec<String> = (0..8)
        .map(|_| pool.enqueue(|| Ok(std::thread::current().name().unwrap_or_default().to_string())))
        .map(|ticket| ticket.wait())
        .collect::<Result<_, _>>()?;
    assert!(names.iter().all(|name| name.starts_with("eos-worker-")));
    Ok(())
}

#[test]
fn zero_threads_still_spawns_one_worker() -> Result<(), EosError> {
    let pool = ThreadPool::new(0)?;
    assert_eq!(pool.threads(), 1);
    Ok(())
}
