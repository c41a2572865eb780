//! Pure-computation conversion from a trail density [`Grid`] to RGBA8.
//!
//! Always available (no feature gate) so callers without `image` can still
//! produce pixel buffers.

use flowlines_core::grid::Grid;

/// Two-color ramp: density 0 is `background`, density 1 is `ink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tint {
    pub background: [u8; 3],
    pub ink: [u8; 3],
}

impl Default for Tint {
    fn default() -> Self {
        Self {
            background: [10, 10, 18],
            ink: [236, 232, 220],
        }
    }
}

impl Tint {
    pub fn new(background: [u8; 3], ink: [u8; 3]) -> Self {
        Self { background, ink }
    }

    /// Color at density `t`, clamped to [0, 1]. NaN maps to the background.
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mut rgb = [0u8; 3];
        for (c, (&bg, &ink)) in rgb.iter_mut().zip(self.background.iter().zip(&self.ink)) {
            *c = (f64::from(bg) + (f64::from(ink) - f64::from(bg)) * t).round() as u8;
        }
        rgb
    }
}

/// Maps every density through `tint` into `width * height * 4` opaque bytes.
pub fn density_to_rgba(density: &Grid, tint: &Tint) -> Vec<u8> {
    density
        .data()
        .iter()
        .flat_map(|&t| {
            let [r, g, b] = tint.sample(t);
            [r, g, b, 255u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_to_rgba_correct_length() {
        let grid = Grid::zeros(8, 4).unwrap();
        assert_eq!(density_to_rgba(&grid, &Tint::default()).len(), 8 * 4 * 4);
    }

    #[test]
    fn alpha_always_255() {
        let grid = Grid::filled(4, 4, 0.5).unwrap();
        let buf = density_to_rgba(&grid, &Tint::default());
        assert!(buf.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn endpoints_hit_tint_colors() {
        let tint = Tint::new([0, 0, 0], [255, 128, 64]);
        assert_eq!(tint.sample(0.0), [0, 0, 0]);
        assert_eq!(tint.sample(1.0), [255, 128, 64]);
    }

    #[test]
    fn out_of_range_density_is_clamped() {
        let tint = Tint::new([20, 40, 60], [220, 240, 250]);
        assert_eq!(tint.sample(-3.0), tint.background);
        assert_eq!(tint.sample(7.0), tint.ink);
        assert_eq!(tint.sample(f64::NAN), tint.background);
    }

    #[test]
    fn midpoint_is_halfway() {
        let tint = Tint::new([0, 100, 200], [100, 200, 0]);
        assert_eq!(tint.sample(0.5), [50, 150, 100]);
    }

    #[test]
    fn ink_can_be_darker_than_background() {
        let tint = Tint::new([255, 255, 255], [0, 0, 0]);
        let grid = Grid::filled(1, 1, 1.0).unwrap();
        assert_eq!(density_to_rgba(&grid, &tint), vec![0, 0, 0, 255]);
    }
}
