//! The seam between flow generators and particle transport.
//!
//! Particles only need a direction at a point. [`FlowSource`] is that
//! contract; the fractal noise field, the SDF-blended composite and the
//! constant [`UniformFlow`] all implement it.

use glam::DVec2;

/// A source of flow directions in world space.
///
/// Implementations must be deterministic for a given state: sampling the
/// same point twice without mutating the source yields the same vector.
pub trait FlowSource: Send + Sync {
    /// Direction of flow at `(x, y)`. Either unit length or exactly zero.
    fn vector_at(&self, x: f64, y: f64) -> DVec2;
}

/// A spatially constant flow pointing along a fixed angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformFlow {
    direction: DVec2,
}

impl UniformFlow {
    /// Flow along `angle` radians, measured from +x toward +y.
    pub fn from_angle(angle: f64) -> Self {
        Self {
            direction: DVec2::from_angle(angle),
        }
    }

    /// Flow along `direction`, normalized. A zero vector stays zero.
    pub fn new(direction: DVec2) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
        }
    }
}

impl FlowSource for UniformFlow {
    fn vector_at(&self, _x: f64, _y: f64) -> DVec2 {
        self.direction
    }
}
