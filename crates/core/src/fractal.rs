//! Multi-octave noise flow: fractal Brownian motion mapped to an angle.

use std::f64::consts::PI;

use glam::DVec2;
use tracing::debug;

use crate::prng::Xorshift64;
use crate::simplex::NoiseField;
use crate::source::FlowSource;

/// Smallest allowed octave count.
pub const MIN_OCTAVES: u32 = 1;
/// Largest allowed octave count.
pub const MAX_OCTAVES: u32 = 8;

/// Default base spatial frequency.
pub const DEFAULT_SCALE: f64 = 0.003;
/// Default octave count.
pub const DEFAULT_OCTAVES: u32 = 3;

/// Time-evolving flow direction field built from fractal noise.
///
/// Each octave halves the amplitude and doubles the frequency, starting from
/// amplitude 1 at frequency `scale`. The weighted sum is divided by the total
/// weight so the result stays in [-1, 1] whatever the octave count.
#[derive(Debug, Clone)]
pub struct FractalFlowField {
    noise: NoiseField,
    scale: f64,
    octaves: u32,
    z_offset: f64,
}

impl FractalFlowField {
    /// Creates a field with the given seed, scale and octave count.
    ///
    /// `octaves` is clamped to [`MIN_OCTAVES`, `MAX_OCTAVES`].
    pub fn new(seed: u32, scale: f64, octaves: u32) -> Self {
        Self {
            noise: NoiseField::new(seed),
            scale,
            octaves: octaves.clamp(MIN_OCTAVES, MAX_OCTAVES),
            z_offset: 0.0,
        }
    }

    /// Creates a field with [`DEFAULT_SCALE`] and [`DEFAULT_OCTAVES`].
    pub fn with_seed(seed: u32) -> Self {
        Self::new(seed, DEFAULT_SCALE, DEFAULT_OCTAVES)
    }

    /// Flow angle at `(x, y)` in [0, 2π].
    pub fn angle_at(&self, x: f64, y: f64) -> f64 {
        let mut sum = 0.0;
        let mut weight = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.scale;
        for _ in 0..self.octaves {
            sum += amplitude * self.noise.sample3d(x * frequency, y * frequency, self.z_offset);
            weight += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        let normalized = (sum / weight).clamp(-1.0, 1.0);
        (normalized + 1.0) * PI
    }

    /// Advances the temporal phase by `delta`.
    pub fn evolve(&mut self, delta: f64) {
        self.z_offset += delta;
    }

    /// Sets the octave count, clamped to [`MIN_OCTAVES`, `MAX_OCTAVES`].
    pub fn set_octaves(&mut self, octaves: u32) {
        self.octaves = octaves.clamp(MIN_OCTAVES, MAX_OCTAVES);
    }

    /// Replaces the base spatial frequency. Affects subsequent samples only.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Swaps in noise built from `seed` and rewinds time to zero.
    pub fn regenerate(&mut self, seed: u32) {
        debug!(seed, "regenerating flow noise");
        self.noise = NoiseField::new(seed);
        self.z_offset = 0.0;
    }

    /// Like [`regenerate`](Self::regenerate) with a seed drawn from `rng`.
    ///
    /// Returns the seed that was used.
    pub fn regenerate_from(&mut self, rng: &mut Xorshift64) -> u32 {
        let seed = rng.next_seed();
        self.regenerate(seed);
        seed
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn z_offset(&self) -> f64 {
        self.z_offset
    }

    pub fn seed(&self) -> u32 {
        self.noise.seed()
    }
}

impl FlowSource for FractalFlowField {
    fn vector_at(&self, x: f64, y: f64) -> DVec2 {
        DVec2::from_angle(self.angle_at(x, y))
    }
}
