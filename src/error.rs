// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use thiserror::Error;

/// Errors that prevent a temporal median run from starting. Once a run has
/// started it cannot fail; see [crate::subtract_temporal_median()].
#[derive(Debug, Error)]
pub enum Error {
    /// The stack has no pixels or no frames.
    #[error("image stack is empty: {width}x{height}x{frames}")]
    EmptyStack { width: usize, height: usize, frames: usize },

    /// A zero-length median window was requested.
    #[error("median window must be at least 1")]
    ZeroWindow,

    /// The stack holds more samples than the filter can address.
    #[error("no support for more than {max} samples, got {samples}; \
             consider splitting the stack")]
    StackTooLarge { samples: u64, max: u64 },

    #[error("unsupported bit depth {0}; must be 1..=16")]
    UnsupportedBitDepth(u32),

    /// Sample buffer (or frame) length disagrees with the stack geometry.
    #[error("expected {expected} samples, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A sample does not fit the declared bit depth.
    #[error("sample value {value} exceeds {bit_depth}-bit range")]
    SampleOutOfRange { value: u16, bit_depth: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
