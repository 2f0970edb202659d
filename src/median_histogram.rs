// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

//! Running median over a sliding window of ranks, after T.S. Huang et al.
//! (1979): the window is held only as a histogram, and the median cursor is
//! nudged as each (remove, add) pair is applied.

use std::cmp::Ordering;

use crate::rank_map::Rank;

/// Maintains the median of a fixed size window of [Rank]s under one-in/one-out
/// updates.
///
/// The median is the element at sorted position `window / 2` (0-indexed); with
/// an odd window this is the true center. `aux` locates that element within
/// its histogram bin, counting from 1 at the bin's lowest slot, so that we
/// know when an update pushes the median past either edge of its bin.
#[derive(Debug, Clone)]
pub struct RunningMedianHistogram {
    hist: Vec<u32>,
    window: usize,
    median: Rank,
    aux: u32,
}

impl RunningMedianHistogram {
    /// Builds the histogram from the first full window.
    ///
    /// # Arguments
    ///   `initial` - The ranks of the first window. Its length is the window
    ///   size and must be odd.
    ///
    ///   `num_ranks` - Histogram size; every rank ever supplied must be below
    ///   this.
    pub fn new(initial: &[Rank], num_ranks: usize) -> RunningMedianHistogram {
        assert!(!initial.is_empty());
        debug_assert!(initial.len() % 2 == 1, "window {} is even", initial.len());
        let mut hist = vec![0_u32; num_ranks];
        for &r in initial {
            hist[r as usize] += 1;
        }
        // Count up the histogram until we pass the median position.
        let median_position = (initial.len() / 2) as u32;
        let mut count = 0_u32;
        let mut j = 0_usize;
        loop {
            count += hist[j];
            if count > median_position {
                break;
            }
            j += 1;
        }
        // `count - hist[j]` elements lie below bin j.
        let aux = median_position - (count - hist[j]) + 1;
        RunningMedianHistogram{hist, window: initial.len(), median: j as Rank, aux}
    }

    pub fn median(&self) -> Rank {
        self.median
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// 1-based position of the median within its bin.
    pub fn aux(&self) -> u32 {
        self.aux
    }

    /// Slides the window: `remove` (the oldest element) leaves and `add`
    /// enters.
    pub fn add_remove(&mut self, add: Rank, remove: Rank) {
        self.hist[remove as usize] -= 1;
        self.hist[add as usize] += 1;
        let m = self.median;
        match (remove.cmp(&m), add.cmp(&m)) {
            // Same side of the median, or a median swapped for a median.
            (Ordering::Less, Ordering::Less) |
            (Ordering::Greater, Ordering::Greater) |
            (Ordering::Equal, Ordering::Equal) => (),

            // The median moves right.
            (Ordering::Less, Ordering::Greater) => {
                if self.hist[m as usize] == self.aux {
                    // Was the top element of its bin.
                    self.step_up();
                } else {
                    self.aux += 1;
                }
            },
            // The median moves left.
            (Ordering::Greater, Ordering::Less) => {
                if self.aux == 1 {
                    // Was the bottom element of its bin.
                    self.step_down();
                } else {
                    self.aux -= 1;
                }
            },
            // One more element ties the median from below.
            (Ordering::Less, Ordering::Equal) => {
                self.aux += 1;
            },
            // Bin grew above the median's slot; nothing moves.
            (Ordering::Greater, Ordering::Equal) => (),

            // A median-valued element left; the bin already shrank.
            (Ordering::Equal, Ordering::Greater) => {
                if self.aux == self.hist[m as usize] + 1 {
                    self.step_up();
                }
            },
            (Ordering::Equal, Ordering::Less) => {
                if self.aux == 1 {
                    self.step_down();
                } else {
                    self.aux -= 1;
                }
            },
        }
    }

    // Moves the median to the lowest element of the next occupied bin above.
    fn step_up(&mut self) {
        let mut j = self.median as usize + 1;
        while self.hist[j] == 0 {
            j += 1;
        }
        self.median = j as Rank;
        self.aux = 1;
    }

    // Moves the median to the highest element of the next occupied bin below.
    fn step_down(&mut self) {
        let mut j = self.median as usize - 1;
        while self.hist[j] == 0 {
            j -= 1;
        }
        self.median = j as Rank;
        self.aux = self.hist[j];
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use super::*;

    // Reference median: sort the window from scratch.
    fn sorted_median(window: &[Rank]) -> Rank {
        let mut sorted = window.to_vec();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    #[test]
    fn test_distinct_values() {
        let data: Vec<Rank> = (0..23).collect();
        let mut hist = RunningMedianHistogram::new(&data, 23);
        assert_eq!(hist.median(), 11);
        assert_eq!(hist.aux(), 1);
        hist.add_remove(0, 22);
        assert_eq!(hist.median(), 10);
        hist.add_remove(0, 21);
        assert_eq!(hist.median(), 9);
    }

    #[test]
    fn test_pairs() {
        // 0,0,1,1,...,10,10,11
        let data: Vec<Rank> = (0..23).map(|i| i / 2).collect();
        let mut hist = RunningMedianHistogram::new(&data, 23);
        assert_eq!(hist.median(), 5);
        assert_eq!(hist.aux(), 2);
        hist.add_remove(0, 11);
        assert_eq!(hist.median(), 5);
        hist.add_remove(0, 10);
        assert_eq!(hist.median(), 4);
    }

    #[test]
    fn test_triples() {
        // 0,0,0,1,1,1,...,6,6,6,7,7
        let data: Vec<Rank> = (0..23).map(|i| i / 3).collect();
        let mut hist = RunningMedianHistogram::new(&data, 23);
        assert_eq!(hist.median(), 3);
        assert_eq!(hist.aux(), 3);
        hist.add_remove(0, 7);
        assert_eq!(hist.median(), 3);
        hist.add_remove(0, 7);
        assert_eq!(hist.median(), 3);

        // Moving right instead.
        let mut hist = RunningMedianHistogram::new(&data, 23);
        hist.add_remove(7, 0);
        assert_eq!(hist.median(), 4);
        hist.add_remove(7, 0);
        assert_eq!(hist.median(), 4);
    }

    #[test]
    fn test_remove_median_value() {
        // Sorted: 1 2 [3] 3 5; median is the first 3.
        let mut hist = RunningMedianHistogram::new(&[3, 1, 5, 3, 2], 8);
        assert_eq!(hist.median(), 3);
        assert_eq!(hist.aux(), 1);
        // Remove a 3, add a 7: 1 2 [3] 5 7.
        hist.add_remove(7, 3);
        assert_eq!(hist.median(), 3);
        assert_eq!(hist.aux(), 1);
        // Remove the last 3, add a 6: 1 2 [5] 6 7.
        hist.add_remove(6, 3);
        assert_eq!(hist.median(), 5);
        assert_eq!(hist.aux(), 1);
        // Remove 5, add 0: 0 1 [2] 6 7.
        hist.add_remove(0, 5);
        assert_eq!(hist.median(), 2);
        assert_eq!(hist.aux(), 1);
    }

    #[test]
    fn test_window_of_one() {
        let mut hist = RunningMedianHistogram::new(&[4], 10);
        assert_eq!(hist.median(), 4);
        for (add, remove) in [(9, 4), (0, 9), (0, 0), (5, 0)] {
            hist.add_remove(add, remove);
            assert_eq!(hist.median(), add);
        }
    }

    #[test]
    fn test_sliding_matches_sort() {
        let mut rng = StdRng::seed_from_u64(17);
        for &window in &[1_usize, 3, 5, 11, 51, 101] {
            for &num_ranks in &[2_usize, 7, 300] {
                let data: Vec<Rank> = (0..2000)
                    .map(|_| rng.gen_range(0..num_ranks) as Rank).collect();
                let mut hist = RunningMedianHistogram::new(&data[..window], num_ranks);
                assert_eq!(hist.median(), sorted_median(&data[..window]));
                for t in 1..=data.len() - window {
                    hist.add_remove(data[t + window - 1], data[t - 1]);
                    assert_eq!(hist.median(), sorted_median(&data[t..t + window]),
                               "window {} ranks {} position {}", window, num_ranks, t);
                }
            }
        }
    }

    #[test]
    fn test_random_replacement_matches_sort() {
        // Replace arbitrary (not oldest) elements of a large window.
        let mut rng = StdRng::seed_from_u64(2019);
        let num_ranks = 20000;
        let mut data: Vec<Rank> = (0..3001)
            .map(|_| rng.gen_range(0..num_ranks) as Rank).collect();
        let mut hist = RunningMedianHistogram::new(&data, num_ranks);
        assert_eq!(hist.median(), sorted_median(&data));
        for _ in 0..1000 {
            let pos = rng.gen_range(0..data.len());
            let add = rng.gen_range(0..num_ranks) as Rank;
            let remove = data[pos];
            data[pos] = add;
            hist.add_remove(add, remove);
            assert_eq!(hist.median(), sorted_median(&data));
        }
    }

    #[test]
    fn test_drifting_signal_matches_sort() {
        // Slowly rising background with noise; the median walks across bins.
        let mut rng = StdRng::seed_from_u64(5);
        let data: Vec<Rank> = (0..3000)
            .map(|t| (t / 10 + rng.gen_range(0..20)) as Rank).collect();
        let window = 25;
        let mut hist = RunningMedianHistogram::new(&data[..window], 400);
        for t in 1..=data.len() - window {
            hist.add_remove(data[t + window - 1], data[t - 1]);
            assert_eq!(hist.median(), sorted_median(&data[t..t + window]));
        }
    }

}  // mod tests.
