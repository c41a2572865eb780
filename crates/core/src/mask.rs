//! Binary inside/outside classification of grid cells.
//!
//! A [`Mask`] is the only thing the distance field consumes from whatever
//! rasterized the shape. Cells are classified once; the shape format itself
//! never reaches the core.

use crate::error::FlowError;

/// Minimum `r + g + b` (out of 765) for a pixel to count as inside.
/// A cell is inside when its channel sum is strictly greater.
pub const INSIDE_THRESHOLD: u16 = 384;

/// A row-major grid of inside (`true`) / outside (`false`) cells.
///
/// Zero-sized masks are representable so that a failed or empty raster can
/// be passed through; building a distance field from one fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Mask {
    /// An all-outside mask.
    pub fn new(width: usize, height: usize) -> Result<Self, FlowError> {
        let len = width
            .checked_mul(height)
            .ok_or(FlowError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            cells: vec![false; len],
        })
    }

    /// Wraps pre-classified cells, validating the length.
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, FlowError> {
        let expected = width
            .checked_mul(height)
            .ok_or(FlowError::InvalidDimensions)?;
        if cells.len() != expected {
            return Err(FlowError::DimensionMismatch {
                width,
                height,
                expected,
                got: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Classifies each cell with `inside(x, y)`.
    pub fn from_fn(
        width: usize,
        height: usize,
        inside: impl Fn(usize, usize) -> bool,
    ) -> Result<Self, FlowError> {
        let mut mask = Self::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                mask.cells[y * width + x] = inside(x, y);
            }
        }
        Ok(mask)
    }

    /// Thresholds an RGBA8 buffer: a pixel is inside when `r + g + b`
    /// exceeds [`INSIDE_THRESHOLD`]. Alpha is ignored.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Result<Self, FlowError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(FlowError::InvalidDimensions)?;
        if rgba.len() != expected {
            return Err(FlowError::DimensionMismatch {
                width,
                height,
                expected,
                got: rgba.len(),
            });
        }
        let cells = rgba
            .chunks_exact(4)
            .map(|px| u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2]) > INSIDE_THRESHOLD)
            .collect();
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether cell `(x, y)` is inside. Cells off the mask are outside.
    pub fn is_inside(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, inside: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = inside;
        }
    }

    /// Row-major cell classification.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn inside_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
