// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

//! Fast temporal median background subtraction for image stacks.
//!
//! Given a time series of frames, every pixel has the running median of its
//! own intensity over a sliding window of frames subtracted. Slowly varying
//! background (autofluorescence, out-of-focus haze, illumination drift) is
//! removed while brief events such as single fluorophore blinks survive.
//!
//! The intended application is preprocessing of single molecule localization
//! microscopy (SMLM) data, where stacks of many thousands of frames must be
//! corrected before localization.
//!
//! # Algorithm
//!
//! The running median uses the histogram method of T.S. Huang et al. (1979):
//! each pixel's window is held as a histogram of values, and sliding the
//! window by one frame (one value out, one in) moves a median cursor by at
//! most a few bins. The cost per frame is effectively constant regardless of
//! the window length, so windows of several hundred frames are practical.
//!
//! To keep the per-pixel histograms small, the sample values are first
//! dense-ranked: the distinct values present anywhere in the stack are
//! numbered 0..R. Typical SMLM data has around a thousand distinct values, so
//! histograms have R bins rather than 65536.
//!
//! Pixels are independent; they are spread over one worker thread per CPU.
//!
//! # Edge frames
//!
//! The first and last `window / 2` frames have no centered window. By default
//! they reuse the median of the first (respectively last) full window. See
//! [WindowAlignment] for the older forward-window convention.
//!
//! # Underflow
//!
//! A sample below its median would go negative. An `offset` is added to every
//! sample before subtraction; samples that still go negative are clamped to
//! zero and counted in [FilterSummary::underflow].
//!
//! # Example
//!
//! ```
//! use temporal_median::{subtract_temporal_median, FilterParams, ImageStack};
//!
//! // One pixel, five frames, a blink at frame 2.
//! let frames: Vec<Vec<u16>> = vec![vec![20], vec![20], vec![90], vec![20], vec![20]];
//! let mut stack = ImageStack::from_frames(1, 1, 16, &frames).unwrap();
//! let params = FilterParams::default().with_window(3).with_offset(5);
//! let summary = subtract_temporal_median(&mut stack, &params).unwrap();
//! assert_eq!(summary.underflow, 0);
//! assert_eq!(stack.column(0, 0), &[5, 5, 75, 5, 5]);
//! ```

pub mod algorithm;
pub mod column;
pub mod error;
pub mod median_histogram;
pub mod params;
pub mod rank_map;
pub mod scheduler;
pub mod stack;

pub use algorithm::{subtract_temporal_median, FilterSummary};
pub use error::{Error, Result};
pub use params::{FilterParams, WindowAlignment};
pub use stack::ImageStack;
