//! Tunable knobs for a flow simulation, their JSON surface and named presets.
//!
//! Every knob maps onto a setter in the core. Out-of-range values are never
//! an error: [`Settings::normalized`] clamps them the same way the setters
//! do, and [`Settings::from_json`] falls back to the default for keys that
//! are missing or have the wrong type.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::distance::DEFAULT_RESOLUTION;
use crate::error::FlowError;
use crate::flow::{
    DEFAULT_SDF_FALLOFF, DEFAULT_SDF_STRENGTH, MAX_SDF_STRENGTH, MIN_SDF_FALLOFF, MIN_SDF_STRENGTH,
};
use crate::fractal::{DEFAULT_OCTAVES, DEFAULT_SCALE, MAX_OCTAVES, MIN_OCTAVES};

/// Upper bound on the particle count a single simulation accepts.
pub const MAX_PARTICLES: usize = 200_000;

const DEFAULT_PARTICLE_COUNT: usize = 3000;
const DEFAULT_SPEED: f64 = 1.5;
const DEFAULT_SPEED_VARIATION: f64 = 0.5;
const DEFAULT_EVOLUTION_RATE: f64 = 0.002;
const DEFAULT_FADE: f64 = 0.03;
const DEFAULT_STROKE_ALPHA: f64 = 0.1;

const PRESET_NAMES: &[&str] = &["calm", "storm", "silk", "contour"];

/// Simulation and styling knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of particles advected each frame.
    pub particle_count: usize,
    /// Base distance travelled per step, in pixels.
    pub speed: f64,
    /// Half-width of the uniform per-particle speed offset.
    pub speed_variation: f64,
    /// Base spatial frequency of the noise.
    pub noise_scale: f64,
    /// Noise octaves, in [1, 8].
    pub octaves: u32,
    /// Temporal phase advanced per step.
    pub evolution_rate: f64,
    /// Boundary deflection strength, in [0, 2].
    pub sdf_strength: f64,
    /// Distance from the boundary at which deflection vanishes, at least 1.
    pub sdf_falloff: f64,
    /// Device pixels per distance-field cell.
    pub sdf_resolution: f64,
    /// Fraction of accumulated trail removed per frame, in [0, 1].
    pub fade: f64,
    /// Density added per drawn trail sample, in [0, 1].
    pub stroke_alpha: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            speed: DEFAULT_SPEED,
            speed_variation: DEFAULT_SPEED_VARIATION,
            noise_scale: DEFAULT_SCALE,
            octaves: DEFAULT_OCTAVES,
            evolution_rate: DEFAULT_EVOLUTION_RATE,
            sdf_strength: DEFAULT_SDF_STRENGTH,
            sdf_falloff: DEFAULT_SDF_FALLOFF,
            sdf_resolution: DEFAULT_RESOLUTION,
            fade: DEFAULT_FADE,
            stroke_alpha: DEFAULT_STROKE_ALPHA,
        }
    }
}

impl Settings {
    /// Reads knobs from a JSON object on top of `self`.
    ///
    /// Missing keys and keys with the wrong JSON type keep their current
    /// value. The result is normalized.
    pub fn merge_json(&self, params: &Value) -> Self {
        Self {
            particle_count: count(params, "particle_count", self.particle_count),
            speed: number(params, "speed", self.speed),
            speed_variation: number(params, "speed_variation", self.speed_variation),
            noise_scale: number(params, "noise_scale", self.noise_scale),
            octaves: count(params, "octaves", self.octaves as usize).min(u32::MAX as usize) as u32,
            evolution_rate: number(params, "evolution_rate", self.evolution_rate),
            sdf_strength: number(params, "sdf_strength", self.sdf_strength),
            sdf_falloff: number(params, "sdf_falloff", self.sdf_falloff),
            sdf_resolution: number(params, "sdf_resolution", self.sdf_resolution),
            fade: number(params, "fade", self.fade),
            stroke_alpha: number(params, "stroke_alpha", self.stroke_alpha),
        }
        .normalized()
    }

    /// Default settings overridden by a JSON object.
    pub fn from_json(params: &Value) -> Self {
        Self::default().merge_json(params)
    }

    /// Current values as a JSON object.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Clamps every knob into its documented range.
    ///
    /// Non-finite numbers fall back to the default for that knob.
    pub fn normalized(&self) -> Self {
        let d = Self::default();
        Self {
            particle_count: self.particle_count.min(MAX_PARTICLES),
            speed: finite_or(self.speed, d.speed),
            speed_variation: finite_or(self.speed_variation, d.speed_variation).max(0.0),
            noise_scale: finite_or(self.noise_scale, d.noise_scale),
            octaves: self.octaves.clamp(MIN_OCTAVES, MAX_OCTAVES),
            evolution_rate: finite_or(self.evolution_rate, d.evolution_rate),
            sdf_strength: finite_or(self.sdf_strength, d.sdf_strength)
                .clamp(MIN_SDF_STRENGTH, MAX_SDF_STRENGTH),
            sdf_falloff: finite_or(self.sdf_falloff, d.sdf_falloff).max(MIN_SDF_FALLOFF),
            sdf_resolution: finite_or(self.sdf_resolution, d.sdf_resolution).max(1.0),
            fade: finite_or(self.fade, d.fade).clamp(0.0, 1.0),
            stroke_alpha: finite_or(self.stroke_alpha, d.stroke_alpha).clamp(0.0, 1.0),
        }
    }

    /// A named bundle of settings.
    ///
    /// Returns `FlowError::UnknownPreset` if `name` is not one of
    /// [`Settings::preset_names`].
    pub fn preset(name: &str) -> Result<Self, FlowError> {
        let d = Self::default();
        let settings = match name {
            "calm" => Self {
                particle_count: 2000,
                speed: 0.8,
                speed_variation: 0.2,
                noise_scale: 0.002,
                octaves: 2,
                evolution_rate: 0.001,
                fade: 0.02,
                stroke_alpha: 0.06,
                ..d
            },
            "storm" => Self {
                particle_count: 6000,
                speed: 3.0,
                speed_variation: 1.5,
                noise_scale: 0.006,
                octaves: 5,
                evolution_rate: 0.01,
                sdf_strength: 1.4,
                fade: 0.08,
                stroke_alpha: 0.15,
                ..d
            },
            "silk" => Self {
                particle_count: 4000,
                speed: 1.2,
                speed_variation: 0.1,
                noise_scale: 0.0015,
                octaves: 1,
                evolution_rate: 0.0005,
                fade: 0.01,
                stroke_alpha: 0.04,
                ..d
            },
            "contour" => Self {
                particle_count: 5000,
                speed: 1.0,
                speed_variation: 0.3,
                octaves: 3,
                sdf_strength: 2.0,
                sdf_falloff: 120.0,
                sdf_resolution: 2.0,
                ..d
            },
            _ => return Err(FlowError::UnknownPreset(name.to_string())),
        };
        Ok(settings)
    }

    /// All recognized preset names.
    pub fn preset_names() -> &'static [&'static str] {
        PRESET_NAMES
    }

    /// Schema describing every knob: type, default, range and description.
    pub fn schema() -> Value {
        let d = Self::default();
        json!({
            "particle_count": {
                "type": "integer",
                "default": d.particle_count,
                "min": 0,
                "max": MAX_PARTICLES,
                "description": "Number of particles advected each frame"
            },
            "speed": {
                "type": "number",
                "default": d.speed,
                "description": "Base distance travelled per step, in pixels"
            },
            "speed_variation": {
                "type": "number",
                "default": d.speed_variation,
                "min": 0.0,
                "description": "Half-width of the random per-particle speed offset"
            },
            "noise_scale": {
                "type": "number",
                "default": d.noise_scale,
                "description": "Base spatial frequency of the flow noise"
            },
            "octaves": {
                "type": "integer",
                "default": d.octaves,
                "min": MIN_OCTAVES,
                "max": MAX_OCTAVES,
                "description": "Noise octaves; each halves amplitude and doubles frequency"
            },
            "evolution_rate": {
                "type": "number",
                "default": d.evolution_rate,
                "description": "Temporal phase advanced per step"
            },
            "sdf_strength": {
                "type": "number",
                "default": d.sdf_strength,
                "min": MIN_SDF_STRENGTH,
                "max": MAX_SDF_STRENGTH,
                "description": "Boundary deflection strength; above 1 extrapolates past the tangent"
            },
            "sdf_falloff": {
                "type": "number",
                "default": d.sdf_falloff,
                "min": MIN_SDF_FALLOFF,
                "description": "Distance from the boundary at which deflection vanishes"
            },
            "sdf_resolution": {
                "type": "number",
                "default": d.sdf_resolution,
                "min": 1.0,
                "description": "Device pixels per distance-field cell"
            },
            "fade": {
                "type": "number",
                "default": d.fade,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of accumulated trail removed per frame"
            },
            "stroke_alpha": {
                "type": "number",
                "default": d.stroke_alpha,
                "min": 0.0,
                "max": 1.0,
                "description": "Density added per drawn trail sample"
            }
        })
    }
}

fn number(params: &Value, name: &str, current: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(current)
}

fn count(params: &Value, name: &str, current: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .map_or(current, |v| usize::try_from(v).unwrap_or(usize::MAX))
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
