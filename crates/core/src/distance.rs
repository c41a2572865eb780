//! Signed distance field built from a binary [`Mask`].
//!
//! Distances are negative inside the shape and positive outside, in world
//! units (`cells * resolution`). The transform runs in two stages per
//! target set:
//!
//! 1. a horizontal chamfer (forward then backward scan of every row,
//!    relaxing each cell to `min(self, neighbour + 1)`);
//! 2. per column, the Felzenszwalb–Huttenlocher lower envelope of parabolas
//!    over the squared row distances.
//!
//! A gradient grid is derived from the signed distances by finite
//! differences. Sampling interpolates bilinearly; positions off the grid
//! have no boundary influence (`+inf` distance, zero gradient).

use glam::DVec2;
use tracing::{info, warn};

use crate::error::FlowError;
use crate::grid::Grid;
use crate::mask::Mask;

/// Cost for cells not yet reached by the transform. Its square still fits
/// comfortably in an `f64`.
const FAR: f64 = 1e20;

/// Gradients shorter than this normalize to zero.
const MIN_GRADIENT: f64 = 1e-4;

/// Default device pixels per distance-field cell.
pub const DEFAULT_RESOLUTION: f64 = 4.0;

#[derive(Debug, Clone)]
struct SdfGrids {
    distance: Grid,
    grad_x: Grid,
    grad_y: Grid,
}

/// Grid-backed signed distance field with gradients.
///
/// A field is either loaded (all three grids present) or empty. Building
/// always starts from scratch and replaces the grids in one assignment; a
/// failed build leaves the field empty.
#[derive(Debug, Clone)]
pub struct DistanceField {
    resolution: f64,
    grids: Option<SdfGrids>,
}

impl DistanceField {
    /// An empty field with `resolution` device pixels per cell.
    ///
    /// Returns `FlowError::InvalidResolution` unless `resolution` is a
    /// positive finite number.
    pub fn new(resolution: f64) -> Result<Self, FlowError> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(FlowError::InvalidResolution(resolution));
        }
        Ok(Self {
            resolution,
            grids: None,
        })
    }

    /// Builds a loaded field from `mask`.
    pub fn from_mask(mask: &Mask, resolution: f64) -> Result<Self, FlowError> {
        let mut field = Self::new(resolution)?;
        field.build(mask)?;
        Ok(field)
    }

    /// Grid dimensions covering a `canvas_width × canvas_height` canvas:
    /// `ceil(canvas / resolution)` per axis.
    pub fn grid_size(canvas_width: f64, canvas_height: f64, resolution: f64) -> (usize, usize) {
        let w = (canvas_width / resolution).ceil().max(0.0) as usize;
        let h = (canvas_height / resolution).ceil().max(0.0) as usize;
        (w, h)
    }

    /// Rebuilds every grid from `mask`.
    ///
    /// Fails with `FlowError::InvalidDimensions` for an empty mask, in which
    /// case the field is cleared.
    pub fn build(&mut self, mask: &Mask) -> Result<(), FlowError> {
        match compute_grids(mask, self.resolution) {
            Ok(grids) => {
                info!(
                    width = mask.width(),
                    height = mask.height(),
                    inside = mask.inside_count(),
                    resolution = self.resolution,
                    "distance field built"
                );
                self.grids = Some(grids);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "distance field build failed; clearing");
                self.clear();
                Err(e)
            }
        }
    }

    /// Discards all grids.
    pub fn clear(&mut self) {
        self.grids = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.grids.is_some()
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Grid width in cells, 0 when not loaded.
    pub fn width(&self) -> usize {
        self.grids.as_ref().map_or(0, |g| g.distance.width())
    }

    /// Grid height in cells, 0 when not loaded.
    pub fn height(&self) -> usize {
        self.grids.as_ref().map_or(0, |g| g.distance.height())
    }

    /// The signed distance grid, in world units.
    pub fn distance_grid(&self) -> Option<&Grid> {
        self.grids.as_ref().map(|g| &g.distance)
    }

    /// Unnormalized `(d/dx, d/dy)` grids, in distance per pixel.
    pub fn gradient_grids(&self) -> Option<(&Grid, &Grid)> {
        self.grids.as_ref().map(|g| (&g.grad_x, &g.grad_y))
    }

    /// Signed distance at world position `(x, y)`.
    ///
    /// Returns `f64::INFINITY` off the grid or when not loaded.
    pub fn distance(&self, x: f64, y: f64) -> f64 {
        let Some(grids) = &self.grids else {
            return f64::INFINITY;
        };
        grids
            .distance
            .sample_bilinear(x / self.resolution, y / self.resolution)
            .unwrap_or(f64::INFINITY)
    }

    /// Unit gradient of the distance at world position `(x, y)`.
    ///
    /// Points toward increasing distance (out of the shape). Returns zero
    /// off the grid, when not loaded, or when the interpolated gradient is
    /// shorter than `1e-4`.
    pub fn gradient(&self, x: f64, y: f64) -> DVec2 {
        let Some(grids) = &self.grids else {
            return DVec2::ZERO;
        };
        let gx = x / self.resolution;
        let gy = y / self.resolution;
        let (Some(dx), Some(dy)) = (
            grids.grad_x.sample_bilinear(gx, gy),
            grids.grad_y.sample_bilinear(gx, gy),
        ) else {
            return DVec2::ZERO;
        };
        let g = DVec2::new(dx, dy);
        let len = g.length();
        if len < MIN_GRADIENT {
            DVec2::ZERO
        } else {
            g / len
        }
    }
}

fn compute_grids(mask: &Mask, resolution: f64) -> Result<SdfGrids, FlowError> {
    let (w, h) = (mask.width(), mask.height());
    if w == 0 || h == 0 {
        return Err(FlowError::InvalidDimensions);
    }

    let to_inside = squared_distance_to(mask, true);
    let to_outside = squared_distance_to(mask, false);

    let signed: Vec<f64> = mask
        .cells()
        .iter()
        .zip(to_inside.iter().zip(&to_outside))
        .map(|(&inside, (&d_in, &d_out))| {
            if inside {
                -d_out.sqrt() * resolution
            } else {
                d_in.sqrt() * resolution
            }
        })
        .collect();
    let distance = Grid::from_data(w, h, signed)?;
    let (grad_x, grad_y) = finite_differences(&distance, resolution)?;

    Ok(SdfGrids {
        distance,
        grad_x,
        grad_y,
    })
}

/// Squared cell distance from every cell to the nearest cell whose mask
/// value equals `target`.
fn squared_distance_to(mask: &Mask, target: bool) -> Vec<f64> {
    let (w, h) = (mask.width(), mask.height());
    let mut cost: Vec<f64> = mask
        .cells()
        .iter()
        .map(|&c| if c == target { 0.0 } else { FAR })
        .collect();

    for row in cost.chunks_exact_mut(w) {
        chamfer_row(row);
    }

    let mut f = vec![0.0; h];
    let mut d = vec![0.0; h];
    let mut v = vec![0usize; h];
    let mut z = vec![0.0; h + 1];
    for x in 0..w {
        for y in 0..h {
            let c = cost[y * w + x];
            f[y] = c * c;
        }
        lower_envelope(&f, &mut d, &mut v, &mut z);
        for y in 0..h {
            cost[y * w + x] = d[y];
        }
    }
    cost
}

/// Two-pass 1D chamfer with unit steps.
fn chamfer_row(row: &mut [f64]) {
    for x in 1..row.len() {
        row[x] = row[x].min(row[x - 1] + 1.0);
    }
    for x in (0..row.len().saturating_sub(1)).rev() {
        row[x] = row[x].min(row[x + 1] + 1.0);
    }
}

/// Felzenszwalb–Huttenlocher 1D squared distance transform.
///
/// `f` holds base costs, `d` receives `min_p ((q - p)^2 + f[p])`. `v` and `z`
/// are scratch buffers of length `n` and `n + 1`.
fn lower_envelope(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = parabola_intersection(f, q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = parabola_intersection(f, q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate().take(n) {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}

/// Abscissa where the parabolas rooted at `q` and `p` intersect.
fn parabola_intersection(f: &[f64], q: usize, p: usize) -> f64 {
    let (qf, pf) = (q as f64, p as f64);
    ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
}

/// Central differences, one-sided at the borders, in distance per pixel.
fn finite_differences(distance: &Grid, resolution: f64) -> Result<(Grid, Grid), FlowError> {
    let (w, h) = (distance.width(), distance.height());
    let d = distance.data();
    let mut gx = vec![0.0; w * h];
    let mut gy = vec![0.0; w * h];

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            gx[idx] = if w == 1 {
                0.0
            } else if x == 0 {
                (d[idx + 1] - d[idx]) / resolution
            } else if x == w - 1 {
                (d[idx] - d[idx - 1]) / resolution
            } else {
                (d[idx + 1] - d[idx - 1]) / (2.0 * resolution)
            };
            gy[idx] = if h == 1 {
                0.0
            } else if y == 0 {
                (d[idx + w] - d[idx]) / resolution
            } else if y == h - 1 {
                (d[idx] - d[idx - w]) / resolution
            } else {
                (d[idx + w] - d[idx - w]) / (2.0 * resolution)
            };
        }
    }

    Ok((Grid::from_data(w, h, gx)?, Grid::from_data(w, h, gy)?))
}
