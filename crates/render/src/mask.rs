//! Boundary masks from image files.

use std::path::Path;

use flowlines_core::error::FlowError;
use flowlines_core::mask::Mask;
use image::imageops::FilterType;
use tracing::debug;

/// Decodes the image at `path`, resizes it to `width × height` and
/// thresholds it into a [`Mask`] (bright pixels are inside).
///
/// Returns `FlowError::InvalidDimensions` for a zero or oversized target,
/// or `FlowError::Io` if the file cannot be read or decoded.
pub fn load_mask(path: &Path, width: usize, height: usize) -> Result<Mask, FlowError> {
    if width == 0 || height == 0 {
        return Err(FlowError::InvalidDimensions);
    }
    let w = u32::try_from(width).map_err(|_| FlowError::InvalidDimensions)?;
    let h = u32::try_from(height).map_err(|_| FlowError::InvalidDimensions)?;

    let img = image::open(path).map_err(|e| FlowError::Io(format!("{}: {e}", path.display())))?;
    let (src_w, src_h) = (img.width(), img.height());
    let rgba = img.resize_exact(w, h, FilterType::Triangle).to_rgba8();
    let mask = Mask::from_rgba(width, height, rgba.as_raw())?;

    debug!(
        path = %path.display(),
        src_w,
        src_h,
        width,
        height,
        inside = mask.inside_count(),
        "loaded mask"
    );
    Ok(mask)
}
