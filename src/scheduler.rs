// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

//! Runs a per-column function over many independent columns on a fixed pool
//! of worker threads.
//!
//! Workers claim columns one at a time from a shared atomic counter, so a
//! worker that draws cheap columns simply claims more of them. Each column is
//! handed to exactly one worker as an exclusive `&mut` slice.

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use log::debug;

/// Number of hardware threads, or 1 if that cannot be determined.
pub fn available_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Applies `process_fn` to every one of `columns` exactly once, using
/// `num_workers` threads. Blocks until all columns are done.
///
/// # Arguments
///   `columns` - Disjoint mutable slices; typically
///   [crate::ImageStack::columns_mut()].
///
///   `num_workers` - Thread count. Clamped to at least 1 and at most the
///   number of columns.
///
///   `init` - Called once per worker to create its private state, e.g.
///   scratch buffers.
///
///   `process_fn` - Called with the worker's state, the column's index within
///   `columns`, and the column itself.
///
/// # Returns
/// The final state of each worker, in no particular order.
///
/// # Panics
/// A panic in any worker is propagated once all workers have stopped.
pub fn run_all<T, S, I, F>(columns: Vec<&mut [T]>, num_workers: usize,
                           init: I, process_fn: F) -> Vec<S>
where
    T: Send,
    S: Send,
    I: Fn() -> S + Sync,
    F: Fn(&mut S, usize, &mut [T]) + Sync,
{
    let run_start = Instant::now();
    let num_columns = columns.len();
    let num_workers = num_workers.clamp(1, num_columns.max(1));

    // One slot per column. The counter hands out each index once, so the
    // locks are never contended; they only move the exclusive borrow into
    // the claiming thread.
    let slots: Vec<Mutex<Option<&mut [T]>>> =
        columns.into_iter().map(|c| Mutex::new(Some(c))).collect();
    let next_column = AtomicUsize::new(0);

    let slots = &slots;
    let next_column = &next_column;
    let init = &init;
    let process_fn = &process_fn;
    let states = thread::scope(|scope| {
        let handles: Vec<_> = (0..num_workers).map(|_| {
            scope.spawn(move || {
                let mut state = init();
                let mut claimed = 0_usize;
                loop {
                    let index = next_column.fetch_add(1, Ordering::Relaxed);
                    if index >= num_columns {
                        break;
                    }
                    let column = slots[index].lock()
                        .unwrap_or_else(PoisonError::into_inner).take();
                    match column {
                        Some(column) => process_fn(&mut state, index, column),
                        None => unreachable!("column {} claimed twice", index),
                    }
                    claimed += 1;
                }
                debug!("Worker finished after {} columns", claimed);
                state
            })
        }).collect();
        handles.into_iter()
            .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect::<Vec<S>>()
    });
    debug!("Processed {} columns on {} workers in {:?}",
           num_columns, num_workers, run_start.elapsed());
    states
}

// mod tests.
