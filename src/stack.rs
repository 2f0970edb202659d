// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::slice::ChunksMut;

use crate::error::{Error, Result};

/// Largest number of samples (width * height * frames) we accept.
pub const MAX_SAMPLES: u64 = 1 << 32;

/// A time series of grayscale frames.
///
/// Samples are stored column-contiguous: all frames of pixel (x, y) are
/// adjacent, so each pixel's time series is a single slice. Hosts usually hold
/// frame-major data; [ImageStack::from_frames()] and
/// [ImageStack::into_frames()] convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageStack {
    width: usize,
    height: usize,
    frames: usize,
    bit_depth: u32,

    // Sample (x, y, t) is at ((y * width + x) * frames + t).
    samples: Vec<u16>,
}

impl ImageStack {
    /// Wraps samples that are already in column-contiguous order.
    pub fn from_columns(width: usize, height: usize, frames: usize, bit_depth: u32,
                        samples: Vec<u16>) -> Result<ImageStack> {
        check_geometry(width, height, frames, bit_depth)?;
        let expected = width * height * frames;
        if samples.len() != expected {
            return Err(Error::DimensionMismatch{expected, actual: samples.len()});
        }
        check_sample_range(&samples, bit_depth)?;
        Ok(ImageStack{width, height, frames, bit_depth, samples})
    }

    /// Builds a stack from frame-major data. Each frame is `width * height`
    /// samples in raster scan order.
    pub fn from_frames(width: usize, height: usize, bit_depth: u32,
                       frames: &[Vec<u16>]) -> Result<ImageStack> {
        check_geometry(width, height, frames.len(), bit_depth)?;
        let num_pixels = width * height;
        let num_frames = frames.len();
        let mut samples = vec![0_u16; num_pixels * num_frames];
        for (t, frame) in frames.iter().enumerate() {
            if frame.len() != num_pixels {
                return Err(Error::DimensionMismatch{expected: num_pixels,
                                                    actual: frame.len()});
            }
            check_sample_range(frame, bit_depth)?;
            for (p, &v) in frame.iter().enumerate() {
                samples[p * num_frames + t] = v;
            }
        }
        Ok(ImageStack{width, height, frames: num_frames, bit_depth, samples})
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Length of each pixel's time series.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    pub fn get(&self, x: usize, y: usize, t: usize) -> u16 {
        assert!(x < self.width && y < self.height && t < self.frames);
        self.samples[(y * self.width + x) * self.frames + t]
    }

    /// The time series of pixel (x, y).
    pub fn column(&self, x: usize, y: usize) -> &[u16] {
        assert!(x < self.width && y < self.height);
        let start = (y * self.width + x) * self.frames;
        &self.samples[start..start + self.frames]
    }

    /// All samples, column-contiguous.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Disjoint mutable time series, one per pixel, in raster scan order.
    pub fn columns_mut(&mut self) -> ChunksMut<'_, u16> {
        self.samples.chunks_mut(self.frames)
    }

    /// Copies out frame `t` in raster scan order.
    pub fn frame(&self, t: usize) -> Vec<u16> {
        assert!(t < self.frames);
        self.samples.iter().skip(t).step_by(self.frames).copied().collect()
    }

    pub fn into_frames(self) -> Vec<Vec<u16>> {
        (0..self.frames).map(|t| self.frame(t)).collect()
    }
}

fn check_geometry(width: usize, height: usize, frames: usize, bit_depth: u32)
                  -> Result<()> {
    if width == 0 || height == 0 || frames == 0 {
        return Err(Error::EmptyStack{width, height, frames});
    }
    if !(1..=16).contains(&bit_depth) {
        return Err(Error::UnsupportedBitDepth(bit_depth));
    }
    let samples = (width as u64)
        .saturating_mul(height as u64)
        .saturating_mul(frames as u64);
    if samples > MAX_SAMPLES {
        return Err(Error::StackTooLarge{samples, max: MAX_SAMPLES});
    }
    Ok(())
}

fn check_sample_range(samples: &[u16], bit_depth: u32) -> Result<()> {
    if bit_depth == 16 {
        return Ok(());
    }
    let limit = 1_u32 << bit_depth;
    match samples.iter().find(|&&v| v as u32 >= limit) {
        Some(&value) => Err(Error::SampleOutOfRange{value, bit_depth}),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x2 pixels, 4 frames; pixel p at frame t has value 10 * t + p.
    fn make_frames() -> Vec<Vec<u16>> {
        (0..4).map(|t| (0..6).map(|p| 10 * t + p).collect()).collect()
    }

    #[test]
    fn test_from_frames_layout() {
        let stack = ImageStack::from_frames(3, 2, 8, &make_frames()).unwrap();
        assert_eq!(stack.frames(), 4);
        assert_eq!(stack.num_pixels(), 6);
        // Pixel (1, 1) is raster index 4.
        assert_eq!(stack.column(1, 1), &[4, 14, 24, 34]);
        assert_eq!(stack.get(2, 0, 3), 32);
        assert_eq!(&stack.samples()[..4], &[0, 10, 20, 30]);
    }

    #[test]
    fn test_frames_round_trip() {
        let frames = make_frames();
        let stack = ImageStack::from_frames(3, 2, 8, &frames).unwrap();
        assert_eq!(stack.frame(2), frames[2]);
        assert_eq!(stack.into_frames(), frames);
    }

    #[test]
    fn test_columns_mut() {
        let mut stack = ImageStack::from_frames(3, 2, 8, &make_frames()).unwrap();
        let columns: Vec<&mut [u16]> = stack.columns_mut().collect();
        assert_eq!(columns.len(), 6);
        assert!(columns.iter().all(|c| c.len() == 4));
        for column in stack.columns_mut() {
            column[0] = 99;
        }
        assert_eq!(stack.frame(0), vec![99; 6]);
    }

    #[test]
    fn test_from_columns() {
        let stack = ImageStack::from_columns(2, 1, 3, 16, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(stack.column(1, 0), &[4, 5, 6]);
        assert_eq!(stack.frame(1), vec![2, 5]);
        assert!(matches!(
            ImageStack::from_columns(2, 1, 3, 16, vec![1, 2, 3]),
            Err(Error::DimensionMismatch{expected: 6, actual: 3})));
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(matches!(ImageStack::from_frames(3, 2, 8, &[]),
                         Err(Error::EmptyStack{..})));
        assert!(matches!(ImageStack::from_columns(0, 2, 1, 8, vec![]),
                         Err(Error::EmptyStack{..})));
        assert!(matches!(ImageStack::from_frames(3, 2, 17, &make_frames()),
                         Err(Error::UnsupportedBitDepth(17))));
        assert!(matches!(ImageStack::from_frames(3, 2, 0, &make_frames()),
                         Err(Error::UnsupportedBitDepth(0))));
        let short_frame = vec![vec![0_u16; 6], vec![0_u16; 5]];
        assert!(matches!(ImageStack::from_frames(3, 2, 8, &short_frame),
                         Err(Error::DimensionMismatch{expected: 6, actual: 5})));
    }

    #[test]
    fn test_rejects_too_many_samples() {
        // Geometry is checked before any allocation.
        assert!(matches!(
            ImageStack::from_columns(1 << 12, 1 << 12, 1 << 9, 16, vec![]),
            Err(Error::StackTooLarge{..})));
    }

    #[test]
    fn test_rejects_out_of_range_sample() {
        let frames = vec![vec![0_u16, 1, 2, 16]];
        assert!(matches!(ImageStack::from_frames(2, 2, 4, &frames),
                         Err(Error::SampleOutOfRange{value: 16, bit_depth: 4})));
        assert!(ImageStack::from_frames(2, 2, 5, &frames).is_ok());
    }

}  // mod tests.
