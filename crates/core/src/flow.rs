//! Composite flow: fractal noise deflected around an optional distance field.
//!
//! Near a shape boundary the noise direction is blended toward a tangent of
//! the boundary, with an influence that falls off quadratically to zero at
//! `sdf_falloff` world units from the edge. Inside the shape the flow is
//! pushed along the gradient, toward the nearest exit.

use std::sync::Arc;

use glam::DVec2;

use crate::distance::DistanceField;
use crate::error::FlowError;
use crate::fractal::FractalFlowField;
use crate::source::FlowSource;

/// Smallest blend strength.
pub const MIN_SDF_STRENGTH: f64 = 0.0;
/// Largest blend strength. Values above 1 extrapolate past the tangent.
pub const MAX_SDF_STRENGTH: f64 = 2.0;
/// Smallest falloff radius, in world units.
pub const MIN_SDF_FALLOFF: f64 = 1.0;

pub const DEFAULT_SDF_STRENGTH: f64 = 0.8;
pub const DEFAULT_SDF_FALLOFF: f64 = 60.0;

/// Blended vectors shorter than this collapse to zero.
const MIN_BLEND_LENGTH: f64 = 1e-4;

/// Fractal flow with optional boundary deflection.
///
/// The distance field is shared, not owned: attaching clones an [`Arc`] to
/// an immutable, already-loaded snapshot, and replacing or detaching it is
/// a single assignment.
#[derive(Debug, Clone)]
pub struct FlowField {
    fractal: FractalFlowField,
    distance: Option<Arc<DistanceField>>,
    sdf_strength: f64,
    sdf_falloff: f64,
}

impl FlowField {
    /// Wraps `fractal` with no distance field and default blend settings.
    pub fn new(fractal: FractalFlowField) -> Self {
        Self {
            fractal,
            distance: None,
            sdf_strength: DEFAULT_SDF_STRENGTH,
            sdf_falloff: DEFAULT_SDF_FALLOFF,
        }
    }

    pub fn fractal(&self) -> &FractalFlowField {
        &self.fractal
    }

    /// Mutable access for evolve / octaves / scale / regenerate.
    pub fn fractal_mut(&mut self) -> &mut FractalFlowField {
        &mut self.fractal
    }

    /// Attaches `field` as the boundary to deflect around.
    ///
    /// Returns `FlowError::FieldNotLoaded` (leaving any current attachment
    /// untouched) if `field` has no grids.
    pub fn attach_distance_field(&mut self, field: Arc<DistanceField>) -> Result<(), FlowError> {
        if !field.is_loaded() {
            return Err(FlowError::FieldNotLoaded);
        }
        self.distance = Some(field);
        Ok(())
    }

    /// Detaches the distance field, returning it if one was attached.
    pub fn detach_distance_field(&mut self) -> Option<Arc<DistanceField>> {
        self.distance.take()
    }

    pub fn distance_field(&self) -> Option<&Arc<DistanceField>> {
        self.distance.as_ref()
    }

    /// Sets the blend strength, clamped to [0, 2].
    pub fn set_sdf_strength(&mut self, strength: f64) {
        self.sdf_strength = clamp_or(strength, MIN_SDF_STRENGTH, MAX_SDF_STRENGTH, MIN_SDF_STRENGTH);
    }

    /// Sets the falloff radius in world units, clamped to at least 1.
    pub fn set_sdf_falloff(&mut self, falloff: f64) {
        self.sdf_falloff = clamp_or(falloff, MIN_SDF_FALLOFF, f64::INFINITY, MIN_SDF_FALLOFF);
    }

    pub fn sdf_strength(&self) -> f64 {
        self.sdf_strength
    }

    pub fn sdf_falloff(&self) -> f64 {
        self.sdf_falloff
    }
}

/// `value.clamp(min, max)`, with NaN mapped to `fallback`.
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

impl FlowSource for FlowField {
    fn vector_at(&self, x: f64, y: f64) -> DVec2 {
        let base = self.fractal.vector_at(x, y);
        let Some(field) = self.distance.as_deref().filter(|f| f.is_loaded()) else {
            return base;
        };
        blend(
            base,
            field.distance(x, y),
            field.gradient(x, y),
            self.sdf_strength,
            self.sdf_falloff,
        )
    }
}

/// Deflects `base` toward the boundary tangent given signed distance `d` and
/// unit gradient `g`.
///
/// Returns `base` untouched at or beyond `falloff` or where `g` is zero.
/// Inside (`d < 0`) the target is `g`; outside it is whichever perpendicular
/// of `g` points along `base`. The result is unit length, or exactly zero
/// when the blend cancels out.
fn blend(base: DVec2, d: f64, g: DVec2, strength: f64, falloff: f64) -> DVec2 {
    if d.abs() >= falloff || g == DVec2::ZERO {
        return base;
    }

    let t = d.abs() / falloff;
    let influence = (1.0 - t * t) * strength;

    let tangent = if d < 0.0 {
        g
    } else {
        let left = DVec2::new(-g.y, g.x);
        if left.dot(base) >= 0.0 {
            left
        } else {
            -left
        }
    };

    let v = base * (1.0 - influence) + tangent * influence;
    let len = v.length();
    if len > MIN_BLEND_LENGTH {
        v / len
    } else {
        DVec2::ZERO
    }
}
