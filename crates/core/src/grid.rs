//! Dense row-major `f64` grid with bounds-checked access and bilinear sampling.
//!
//! Unlike a toroidal field, coordinates outside the grid are not wrapped:
//! lookups return `None` so callers can decide what "outside" means.

use crate::error::FlowError;

/// A 2D grid of unclamped `f64` values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Creates a grid filled with `value`.
    ///
    /// Returns `FlowError::InvalidDimensions` if either dimension is zero
    /// or if `width * height` overflows `usize`.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self, FlowError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Creates a zero-filled grid.
    pub fn zeros(width: usize, height: usize) -> Result<Self, FlowError> {
        Self::filled(width, height, 0.0)
    }

    /// Wraps a pre-built row-major vector, validating its length.
    pub fn from_data(width: usize, height: usize, data: Vec<f64>) -> Result<Self, FlowError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(FlowError::DimensionMismatch {
                width,
                height,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at cell `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Writes cell `(x, y)`. Writes outside the grid are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Multiplies every cell by `factor`.
    pub fn scale_assign(&mut self, factor: f64) {
        self.data.iter_mut().for_each(|v| *v *= factor);
    }

    /// Bilinear interpolation at continuous grid coordinates `(gx, gy)`.
    ///
    /// The cell containing the point must lie inside the grid; otherwise (or
    /// for non-finite input) this returns `None`. The right and bottom
    /// neighbours are clamped to the last row and column, so the final cell
    /// still samples.
    pub fn sample_bilinear(&self, gx: f64, gy: f64) -> Option<f64> {
        if !gx.is_finite() || !gy.is_finite() || gx < 0.0 || gy < 0.0 {
            return None;
        }
        let x0 = gx.floor() as usize;
        let y0 = gy.floor() as usize;
        if x0 >= self.width || y0 >= self.height {
            return None;
        }
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = gx - x0 as f64;
        let fy = gy - y0 as f64;

        let v00 = self.data[y0 * self.width + x0];
        let v10 = self.data[y0 * self.width + x1];
        let v01 = self.data[y1 * self.width + x0];
        let v11 = self.data[y1 * self.width + x1];

        let top = v00 + (v10 - v00) * fx;
        let bottom = v01 + (v11 - v01) * fx;
        Some(top + (bottom - top) * fy)
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, FlowError> {
    if width == 0 || height == 0 {
        return Err(FlowError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .ok_or(FlowError::InvalidDimensions)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Constructors --

    #[test]
    fn filled_creates_correct_values() {
        let grid = Grid::filled(3, 2, -4.5).unwrap();
        assert_eq!(grid.data().len(), 6);
        assert!(grid.data().iter().all(|&v| v == -4.5));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(Grid::zeros(0, 4), Err(FlowError::InvalidDimensions)));
        assert!(matches!(Grid::zeros(4, 0), Err(FlowError::InvalidDimensions)));
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(Grid::zeros(usize::MAX, 2).is_err());
    }

    #[test]
    fn from_data_rejects_wrong_length() {
        let result = Grid::from_data(2, 2, vec![1.0; 3]);
        assert!(matches!(
            result,
            Err(FlowError::DimensionMismatch {
                expected: 4,
                got: 3,
                ..
            })
        ));
    }

    // -- Access --

    #[test]
    fn get_and_set_round_trip_without_clamping() {
        let mut grid = Grid::zeros(4, 4).unwrap();
        grid.set(2, 3, 1e9);
        assert_eq!(grid.get(2, 3), Some(1e9));
    }

    #[test]
    fn get_outside_returns_none() {
        let grid = Grid::zeros(4, 4).unwrap();
        assert_eq!(grid.get(4, 0), None);
        assert_eq!(grid.get(0, 4), None);
    }

    #[test]
    fn set_outside_is_ignored() {
        let mut grid = Grid::zeros(2, 2).unwrap();
        grid.set(5, 5, 1.0);
        assert!(grid.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn scale_assign_multiplies() {
        let mut grid = Grid::filled(2, 2, 0.8).unwrap();
        grid.scale_assign(0.5);
        assert!(grid.data().iter().all(|&v| (v - 0.4).abs() < 1e-12));
    }

    // -- Bilinear sampling --

    #[test]
    fn sample_at_cell_corner_returns_cell_value() {
        let grid = Grid::from_data(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(grid.sample_bilinear(1.0, 1.0), Some(4.0));
        assert_eq!(grid.sample_bilinear(0.0, 0.0), Some(1.0));
    }

    #[test]
    fn sample_interpolates_between_cells() {
        let grid = Grid::from_data(2, 2, vec![0.0, 10.0, 20.0, 30.0]).unwrap();
        let mid = grid.sample_bilinear(0.5, 0.5).unwrap();
        assert!((mid - 15.0).abs() < 1e-12);
        let edge = grid.sample_bilinear(0.25, 0.0).unwrap();
        assert!((edge - 2.5).abs() < 1e-12);
    }

    #[test]
    fn sample_in_last_cell_clamps_neighbours() {
        let grid = Grid::from_data(2, 1, vec![1.0, 5.0]).unwrap();
        assert_eq!(grid.sample_bilinear(1.5, 0.5), Some(5.0));
    }

    #[test]
    fn sample_outside_returns_none() {
        let grid = Grid::zeros(4, 4).unwrap();
        assert_eq!(grid.sample_bilinear(-0.01, 1.0), None);
        assert_eq!(grid.sample_bilinear(1.0, 4.0), None);
        assert_eq!(grid.sample_bilinear(f64::NAN, 1.0), None);
    }
}
