// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::time::Instant;

use log::debug;

/// Dense rank of a sample value; see [RankMap].
pub type Rank = u16;

/// Dense ranking ("1223" ranking) of the sample values present in an image.
///
/// Single molecule data typically uses only a thousand or so of the 65536
/// possible 16 bit values. Mapping each present value to its rank among the
/// present values lets the per-column median histograms be sized by the
/// number of distinct values rather than by the full bit depth.
///
/// Example: samples [0 5 6 5 10 6] are ranked [0 1 2 1 3 2] and the inverse
/// table is [0 5 6 10].
#[derive(Debug, Clone)]
pub struct RankMap {
    // Indexed by sample value. Entries for values absent from the image are
    // meaningless.
    to_rank: Vec<Rank>,

    // Indexed by rank; strictly increasing.
    from_rank: Vec<u16>,
}

impl RankMap {
    /// Builds the rank map for `samples`, whose values must all be below
    /// 2^`bit_depth`.
    pub fn build(samples: &[u16], bit_depth: u32) -> RankMap {
        assert!((1..=16).contains(&bit_depth));
        let build_start = Instant::now();
        let num_values = 1_usize << bit_depth;

        let mut present = vec![false; num_values];
        for &v in samples {
            present[v as usize] = true;
        }

        // `absent_below` is the number of values below v that do not occur
        // in the image; a present value's rank is v minus that count.
        let mut to_rank = vec![0 as Rank; num_values];
        let mut from_rank = Vec::<u16>::new();
        let mut absent_below = 0_usize;
        for v in 0..num_values {
            if present[v] {
                to_rank[v] = (v - absent_below) as Rank;
                from_rank.push(v as u16);
            } else {
                absent_below += 1;
            }
        }
        debug!("Ranked {} distinct values of {} in {:?}",
               from_rank.len(), num_values, build_start.elapsed());
        RankMap{to_rank, from_rank}
    }

    /// Number of distinct sample values, i.e. the number of ranks.
    pub fn num_ranks(&self) -> usize {
        self.from_rank.len()
    }

    pub fn to_rank(&self, value: u16) -> Rank {
        debug_assert!(self.is_present(value),
                      "value {} not present in rank map", value);
        self.to_rank[value as usize]
    }

    pub fn from_rank(&self, rank: Rank) -> u16 {
        self.from_rank[rank as usize]
    }

    /// Whether `value` occurred in the samples the map was built from.
    pub fn is_present(&self, value: u16) -> bool {
        match self.to_rank.get(value as usize) {
            Some(&r) => self.from_rank.get(r as usize) == Some(&value),
            None => false,
        }
    }

    /// Writes the rank of each of `samples` into `ranks`.
    pub fn rank_column(&self, samples: &[u16], ranks: &mut [Rank]) {
        assert_eq!(samples.len(), ranks.len());
        for (r, &v) in ranks.iter_mut().zip(samples) {
            *r = self.to_rank(v);
        }
    }
}

// mod tests.
