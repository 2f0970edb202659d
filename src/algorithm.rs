// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::column::{ColumnProcessor, ColumnTally};
use crate::error::Result;
use crate::params::FilterParams;
use crate::rank_map::RankMap;
use crate::scheduler;
use crate::stack::ImageStack;

/// Outcome of [subtract_temporal_median()].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSummary {
    /// The window actually used, after adjustment to the series length.
    pub window: usize,

    /// Number of frames in the stack.
    pub frames: usize,

    /// Number of distinct sample values in the input.
    pub distinct_values: usize,

    /// Samples clamped to zero because they fell more than `offset` below
    /// their median. A large count suggests the offset should be raised.
    pub underflow: u64,

    /// Samples clamped to u16::MAX.
    pub saturated: u64,

    pub elapsed: Duration,
}

impl FilterSummary {
    /// Average number of underflowed samples per frame.
    pub fn underflow_per_frame(&self) -> f64 {
        self.underflow as f64 / self.frames as f64
    }
}

// Underflow rates at or above this many samples per frame are logged as a
// warning rather than informationally.
const UNDERFLOW_WARN_PER_FRAME: u64 = 10;

/// Subtracts from every sample of `stack` the median of its own pixel's time
/// series over a sliding window, in place.
///
/// # Arguments
///   `stack` - The frames to correct. Each pixel's time series is processed
///   independently.
///
///   `params` - Window, offset, window alignment and worker count. The window
///   is adjusted as described at [FilterParams::effective_window()].
///
/// # Returns
/// [FilterSummary] describing the run, or an error if the parameters cannot
/// be used. Nothing is modified when an error is returned.
pub fn subtract_temporal_median(stack: &mut ImageStack, params: &FilterParams)
                                -> Result<FilterSummary> {
    let filter_start = Instant::now();
    let frames = stack.frames();
    let window = params.effective_window(frames)?;
    let num_workers = params.effective_workers();
    debug!("Stack {}x{}x{} at {} bits; window {} offset {} {:?} on {} workers",
           stack.width(), stack.height(), frames, stack.bit_depth(),
           window, params.offset, params.alignment, num_workers);

    let rank_map = RankMap::build(stack.samples(), stack.bit_depth());
    let distinct_values = rank_map.num_ranks();

    let worker_tallies = scheduler::run_all(
        stack.columns_mut().collect(), num_workers,
        || (ColumnProcessor::new(&rank_map, window, params.offset, params.alignment),
            ColumnTally::default()),
        |(processor, tally), _index, column| {
            *tally += processor.process(column);
        });
    let mut tally = ColumnTally::default();
    for (_processor, worker_tally) in worker_tallies {
        tally += worker_tally;
    }

    let summary = FilterSummary{window, frames, distinct_values,
                                underflow: tally.underflow,
                                saturated: tally.saturated,
                                elapsed: filter_start.elapsed()};
    report(&summary);
    Ok(summary)
}

fn report(summary: &FilterSummary) {
    let per_frame = summary.underflow / summary.frames as u64;
    if per_frame >= UNDERFLOW_WARN_PER_FRAME {
        warn!("{} pixels went below zero ({} per frame). Consider increasing the offset.",
              summary.underflow, per_frame);
    } else if summary.underflow > 0 {
        info!("{} pixels went below zero ({} per frame). Consider increasing the offset.",
              summary.underflow, per_frame);
    }
    if summary.saturated > 0 {
        warn!("{} pixels saturated. Consider decreasing the offset.", summary.saturated);
    }
    info!("Temporal median with window {} over {} distinct values done in {:?}",
          summary.window, summary.distinct_values, summary.elapsed);
}

// mod tests.
