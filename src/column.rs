// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::ops::AddAssign;

use crate::median_histogram::RunningMedianHistogram;
use crate::params::WindowAlignment;
use crate::rank_map::{Rank, RankMap};

/// Counts of corrected samples that fell outside the u16 range and were
/// clamped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnTally {
    /// Samples that would have gone below zero.
    pub underflow: u64,

    /// Samples pushed past u16::MAX by the offset.
    pub saturated: u64,
}

impl AddAssign for ColumnTally {
    fn add_assign(&mut self, other: ColumnTally) {
        self.underflow += other.underflow;
        self.saturated += other.saturated;
    }
}

/// Subtracts the running temporal median from one pixel's time series at a
/// time. A worker creates one processor and feeds it every column it claims;
/// the scratch buffers are reused across columns, the median histogram is
/// not.
pub struct ColumnProcessor<'a> {
    rank_map: &'a RankMap,
    window: usize,
    offset: u16,
    alignment: WindowAlignment,

    // Scratch, sized to the column length.
    ranked: Vec<Rank>,
    medians: Vec<u16>,
}

impl<'a> ColumnProcessor<'a> {
    /// `window` must be odd. `rank_map` must cover every sample of every
    /// column later passed to [ColumnProcessor::process()].
    pub fn new(rank_map: &'a RankMap, window: usize, offset: u16,
               alignment: WindowAlignment) -> ColumnProcessor<'a> {
        assert!(window % 2 == 1, "window {} must be odd", window);
        ColumnProcessor{rank_map, window, offset, alignment,
                        ranked: Vec::new(), medians: Vec::new()}
    }

    /// Replaces each sample of `column` by `offset + sample - median`, where
    /// the median is taken over the window selected by the alignment. Results
    /// are clamped to the u16 range.
    ///
    /// # Panics
    /// If `column` is shorter than the window.
    pub fn process(&mut self, column: &mut [u16]) -> ColumnTally {
        let frames = column.len();
        let window = self.window;
        assert!(window <= frames, "window {} exceeds {} frames", window, frames);

        // Medians are computed entirely on ranks before any sample is
        // overwritten.
        self.ranked.resize(frames, 0);
        self.rank_map.rank_column(column, &mut self.ranked);
        let num_medians = frames - window + 1;
        self.medians.clear();
        self.medians.reserve(num_medians);
        let mut hist = RunningMedianHistogram::new(
            &self.ranked[..window], self.rank_map.num_ranks());
        self.medians.push(self.rank_map.from_rank(hist.median()));
        for t in 1..num_medians {
            hist.add_remove(self.ranked[t + window - 1], self.ranked[t - 1]);
            self.medians.push(self.rank_map.from_rank(hist.median()));
        }

        let last = num_medians - 1;
        let half_window = (window - 1) / 2;
        let offset = self.offset as i32;
        let mut tally = ColumnTally::default();
        for (t, sample) in column.iter_mut().enumerate() {
            let median_index = match self.alignment {
                WindowAlignment::Centered => t.saturating_sub(half_window).min(last),
                WindowAlignment::Forward => t.min(last),
            };
            let corrected = offset + *sample as i32 - self.medians[median_index] as i32;
            *sample = if corrected < 0 {
                tally.underflow += 1;
                0
            } else if corrected > u16::MAX as i32 {
                tally.saturated += 1;
                u16::MAX
            } else {
                corrected as u16
            };
        }
        tally
    }
}

// mod tests.
