//! PNG output of a trail density grid.
//!
//! Feature-gated behind `png` (default on). The byte conversion itself lives
//! in [`crate::pixel`].

use std::path::Path;

use flowlines_core::error::FlowError;
use flowlines_core::grid::Grid;

use crate::pixel::{density_to_rgba, Tint};

/// Writes `density` as a PNG image, mapping values through `tint`.
///
/// Returns `FlowError::InvalidDimensions` if the grid dimensions overflow
/// `u32`, or `FlowError::Io` on write failure.
pub fn write_png(density: &Grid, tint: &Tint, path: &Path) -> Result<(), FlowError> {
    let rgba = density_to_rgba(density, tint);
    let w = u32::try_from(density.width()).map_err(|_| FlowError::InvalidDimensions)?;
    let h = u32::try_from(density.height()).map_err(|_| FlowError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FlowError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| FlowError::Io(e.to_string()))
}
