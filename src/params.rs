// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use log::warn;

use crate::error::{Error, Result};
use crate::scheduler::available_workers;

/// Which window's median is subtracted from frame `t`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WindowAlignment {
    /// The window centered on `t`. Frames within half a window of either end
    /// of the series use the first or last full window's median.
    #[default]
    Centered,

    /// The window starting at `t`; the last `window - 1` frames use the last
    /// full window's median. Older releases of the filter behaved this way.
    Forward,
}

/// Parameters of a temporal median run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterParams {
    /// Number of frames in the median window. Should be odd and no longer
    /// than the series; see [FilterParams::effective_window()].
    pub window: usize,

    /// Added to every sample before the median is subtracted, so that pixels
    /// slightly below their background do not clip at zero.
    pub offset: u16,

    pub alignment: WindowAlignment,

    /// Worker thread count. None means one per available CPU.
    pub num_workers: Option<usize>,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams{window: 501, offset: 100,
                     alignment: WindowAlignment::Centered, num_workers: None}
    }
}

impl FilterParams {
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_offset(mut self, offset: u16) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_alignment(mut self, alignment: WindowAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = Some(num_workers);
        self
    }

    /// Returns the window actually used for a series of `frames` samples. An
    /// even window is lengthened by one; a window longer than the series is
    /// cut to the series length, then shortened by one if that is even. Any
    /// adjustment is logged.
    pub fn effective_window(&self, frames: usize) -> Result<usize> {
        if self.window == 0 {
            return Err(Error::ZeroWindow);
        }
        assert!(frames > 0);
        let mut window = self.window;
        if window >= frames {
            window = frames;
            if window % 2 == 0 {
                window -= 1;
            }
            if window != self.window {
                warn!("Window {} does not fit {} frames. Reducing window to {}",
                      self.window, frames, window);
            }
        } else if window % 2 == 0 {
            window += 1;
            warn!("No support for even windows. Window = {}", window);
        }
        Ok(window)
    }

    pub fn effective_workers(&self) -> usize {
        match self.num_workers {
            Some(n) => n.max(1),
            None => available_workers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = FilterParams::default();
        assert_eq!(params.window, 501);
        assert_eq!(params.offset, 100);
        assert_eq!(params.alignment, WindowAlignment::Centered);
        assert!(params.effective_workers() >= 1);
    }

    #[test]
    fn test_effective_window() {
        let params = FilterParams::default();
        assert_eq!(params.clone().with_window(5).effective_window(100).unwrap(), 5);
        // Even windows grow by one.
        assert_eq!(params.clone().with_window(4).effective_window(100).unwrap(), 5);
        assert_eq!(params.clone().with_window(98).effective_window(100).unwrap(), 99);
        // Windows are cut to the series length, kept odd.
        assert_eq!(params.clone().with_window(501).effective_window(100).unwrap(), 99);
        assert_eq!(params.clone().with_window(501).effective_window(101).unwrap(), 101);
        assert_eq!(params.clone().with_window(100).effective_window(100).unwrap(), 99);
        assert_eq!(params.clone().with_window(101).effective_window(101).unwrap(), 101);
        assert_eq!(params.clone().with_window(7).effective_window(1).unwrap(), 1);
        assert_eq!(params.clone().with_window(2).effective_window(2).unwrap(), 1);
    }

    #[test]
    fn test_zero_window() {
        let params = FilterParams::default().with_window(0);
        assert!(matches!(params.effective_window(10), Err(Error::ZeroWindow)));
    }

    #[test]
    fn test_effective_workers() {
        assert_eq!(FilterParams::default().with_num_workers(3).effective_workers(), 3);
        assert_eq!(FilterParams::default().with_num_workers(0).effective_workers(), 1);
    }

}  // mod tests.
