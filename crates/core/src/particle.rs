//! Point particles advected through a [`FlowSource`] on a toroidal canvas.

use glam::DVec2;

use crate::prng::Xorshift64;
use crate::source::FlowSource;

/// A single advected point.
///
/// `prev` is the position before the last step and only exists so a renderer
/// can draw the `prev → pos` segment. After a wrap it is collapsed onto the
/// new position so the segment does not streak across the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pos: DVec2,
    prev: DVec2,
    speed: f64,
    width: f64,
    height: f64,
}

impl Particle {
    /// Spawns a particle at a uniformly random point inside `width × height`
    /// with speed `base_speed + uniform(-variation, variation)`.
    pub fn spawn(
        width: f64,
        height: f64,
        base_speed: f64,
        variation: f64,
        rng: &mut Xorshift64,
    ) -> Self {
        let mut particle = Self::at(DVec2::ZERO, 0.0, width, height);
        particle.reset(rng);
        particle.set_speed(base_speed, variation, rng);
        particle
    }

    /// A particle at `pos` with an exact `speed`. `prev` starts at `pos`.
    pub fn at(pos: DVec2, speed: f64, width: f64, height: f64) -> Self {
        Self {
            pos,
            prev: pos,
            speed,
            width,
            height,
        }
    }

    /// Moves one step along `source` and wraps around the bounds.
    pub fn integrate<S: FlowSource + ?Sized>(&mut self, source: &S) {
        self.prev = self.pos;
        let v = source.vector_at(self.pos.x, self.pos.y);
        self.pos += v * self.speed;

        self.pos.x = wrap(self.pos.x, self.width);
        self.pos.y = wrap(self.pos.y, self.height);

        if (self.pos.x - self.prev.x).abs() > self.width / 2.0 {
            self.prev.x = self.pos.x;
        }
        if (self.pos.y - self.prev.y).abs() > self.height / 2.0 {
            self.prev.y = self.pos.y;
        }
    }

    /// Moves to a uniformly random point inside the bounds with no trail.
    pub fn reset(&mut self, rng: &mut Xorshift64) {
        self.pos = DVec2::new(rng.next_f64() * self.width, rng.next_f64() * self.height);
        self.prev = self.pos;
    }

    /// Updates the wrap bounds without moving the particle.
    pub fn set_bounds(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Redraws the speed as `base + uniform(-variation, variation)`.
    ///
    /// There is no floor: when `variation > base` the speed can come out
    /// negative and the particle travels against the flow.
    pub fn set_speed(&mut self, base: f64, variation: f64, rng: &mut Xorshift64) {
        self.speed = base + rng.next_range(-variation, variation);
    }

    pub fn position(&self) -> DVec2 {
        self.pos
    }

    pub fn previous(&self) -> DVec2 {
        self.prev
    }

    /// The `(previous, current)` segment drawn for this frame.
    pub fn segment(&self) -> (DVec2, DVec2) {
        (self.prev, self.pos)
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Toroidal wrap: below zero jumps to `size`, above `size` jumps to zero.
fn wrap(value: f64, size: f64) -> f64 {
    if value < 0.0 {
        size
    } else if value > size {
        0.0
    } else {
        value
    }
}
