//! Bounded fingerprinting pool.
//!
//! A rayon pool of `workers` threads hashes paths and sends each outcome
//! down one channel. The calling thread is the only consumer, so whatever
//! it does with a record (appending to the manifest) is never concurrent.

use crate::error::Error;
use crate::hasher;
use crate::manifest::models::FileRecord;
use crossbeam_channel::bounded;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::debug;

/// Tally of one pool run. `recorded + failed` always equals the input length
/// unless the consumer aborted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub recorded: usize,
    pub failed: usize,
}

/// Fingerprint every path using at most `workers` concurrent hashes.
///
/// `on_result` runs on the calling thread once per path, in completion
/// order, with the 1-based completed count. Returning `Err` from it stops
/// the run: queued paths are dropped unhashed and the error is returned.
pub fn fingerprint_all<F>(
    paths: &[PathBuf],
    workers: usize,
    mut on_result: F,
) -> Result<PoolStats, Error>
where
    F: FnMut(&Path, Result<FileRecord, Error>, usize) -> Result<(), Error>,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("fingerprint-{}", i))
        .build()?;

    let (tx, rx) = bounded::<(&Path, Result<FileRecord, Error>)>(workers.max(1) * 2);
    let aborted = AtomicBool::new(false);
    let mut stats = PoolStats::default();
    let mut consumer_error = None;

    thread::scope(|scope| {
        let aborted = &aborted;
        scope.spawn(move || {
            pool.install(|| {
                paths.par_iter().for_each_with(tx, |tx, path| {
                    if aborted.load(Ordering::Relaxed) {
                        return;
                    }
                    let outcome = hasher::fingerprint_file(path);
                    // Receiver only disappears after an abort.
                    let _ = tx.send((path.as_path(), outcome));
                });
            });
        });

        let mut completed = 0usize;
        for (path, outcome) in rx.iter() {
            completed += 1;
            match &outcome {
                Ok(_) => stats.recorded += 1,
                Err(_) => stats.failed += 1,
            }
            if let Err(e) = on_result(path, outcome, completed) {
                aborted.store(true, Ordering::Relaxed);
                consumer_error = Some(e);
                break;
            }
        }
        drop(rx);
    });

    match consumer_error {
        Some(e) => Err(e),
        None => {
            debug!(
                "Pool finished: {} recorded, {} failed",
                stats.recorded, stats.failed
            );
            Ok(stats)
        }
    }
}
