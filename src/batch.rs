//! Parallel analysis of several packages.
//!
//! Packages are taken from a shared queue by a fixed number of worker threads. A worker that
//! panics loses the package it was analyzing; whatever it left in the queue is still analyzed by
//! the remaining workers, or reported as failed if none is left.

use crate::{results::Benchmark, utils::print_error};
use anyhow::Result;
use log::error;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
    thread,
};

/// Outcome of the analysis of a set of packages.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    benchmarks: BTreeMap<String, Vec<Benchmark>>,
    failed: Vec<String>,
    panicked: usize,
}

impl BatchOutcome {
    /// Gets the benchmarks of every package analyzed successfully.
    pub fn benchmarks(&self) -> &BTreeMap<String, Vec<Benchmark>> {
        &self.benchmarks
    }

    /// Gets the packages whose analysis failed or never ran, sorted.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Gets the number of worker threads that panicked.
    pub fn panicked(&self) -> usize {
        self.panicked
    }

    /// Checks if every package was analyzed successfully.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.panicked == 0
    }
}

/// Analyzes every package with `analyze`, using up to `threads` worker threads.
///
/// Errors are printed as soon as they happen, with their causes if `verbose` is set.
pub fn analyze_packages<F>(
    packages: Vec<String>,
    threads: usize,
    verbose: bool,
    analyze: F,
) -> BatchOutcome
where
    F: Fn(&str) -> Result<Vec<Benchmark>> + Send + Sync + 'static,
{
    let threads = threads.min(packages.len()).max(1);
    let analyze = Arc::new(analyze);
    let queue = Arc::new(Mutex::new(packages));
    let outcome = Arc::new(Mutex::new(BatchOutcome::default()));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let thread_analyze = Arc::clone(&analyze);
            let thread_queue = Arc::clone(&queue);
            let thread_outcome = Arc::clone(&outcome);

            thread::spawn(move || loop {
                let package = match lock(&thread_queue).pop() {
                    Some(p) => p,
                    None => break,
                };

                match thread_analyze(&package) {
                    Ok(benchmarks) => {
                        let _ = lock(&thread_outcome).benchmarks.insert(package, benchmarks);
                    }
                    Err(e) => {
                        print_error(&e, verbose);
                        lock(&thread_outcome).failed.push(package);
                    }
                }
            })
        })
        .collect();

    let mut panicked = 0;
    for t in handles {
        if t.join().is_err() {
            error!("an analysis thread panicked");
            panicked += 1;
        }
    }

    let mut outcome = lock(&outcome);
    outcome.panicked = panicked;
    outcome.failed.append(&mut lock(&queue));
    outcome.failed.sort();
    std::mem::take(&mut *outcome)
}

/// Locks the mutex, recovering the data if a panicking worker poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
