//! Error types for the flowlines core.
//!
//! Only construction can fail. Sampling, blending and integration degrade
//! to neutral values (infinite distance, zero vectors) instead of erroring.

use thiserror::Error;

/// Errors produced by flowlines operations.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Width or height was zero (or their product overflowed) when creating
    /// a mask, grid or simulation.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A pixel buffer did not match the dimensions it was declared with.
    #[error("buffer length mismatch: expected {expected} bytes for {width}x{height}, got {got}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },

    /// A mask did not have the grid size the canvas needs at the current
    /// distance-field resolution.
    #[error("mask is {width}x{height} cells, expected {expected_width}x{expected_height}")]
    MaskSize {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    /// A distance field resolution was zero, negative or not finite.
    #[error("invalid resolution {0}: must be a positive finite number of pixels per cell")]
    InvalidResolution(f64),

    /// A distance field was attached before it finished loading.
    #[error("distance field is not loaded")]
    FieldNotLoaded,

    /// A preset name was not recognized.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Reading or writing an external file failed.
    #[error("i/o error: {0}")]
    Io(String),
}
