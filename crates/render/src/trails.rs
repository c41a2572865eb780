//! Trail accumulation: a density grid that fades each frame and gains
//! `stroke_alpha` along every drawn segment.

use flowlines_core::error::FlowError;
use flowlines_core::grid::Grid;
use flowlines_core::simulation::Simulation;
use glam::DVec2;

/// Per-pixel trail density in [0, 1].
#[derive(Debug, Clone)]
pub struct TrailCanvas {
    density: Grid,
}

impl TrailCanvas {
    /// A blank canvas. Returns `FlowError::InvalidDimensions` on zero size.
    pub fn new(width: usize, height: usize) -> Result<Self, FlowError> {
        Ok(Self {
            density: Grid::zeros(width, height)?,
        })
    }

    pub fn width(&self) -> usize {
        self.density.width()
    }

    pub fn height(&self) -> usize {
        self.density.height()
    }

    pub fn density(&self) -> &Grid {
        &self.density
    }

    pub fn clear(&mut self) {
        self.density.fill(0.0);
    }

    /// Removes `amount` of the accumulated density, clamped to [0, 1].
    pub fn fade(&mut self, amount: f64) {
        self.density.scale_assign(1.0 - amount.clamp(0.0, 1.0));
    }

    /// Adds `alpha` to every pixel the segment `a → b` passes through.
    ///
    /// The walk samples at most one point per pixel step and excludes `b`,
    /// which is the start of the particle's next segment. A zero-length
    /// segment deposits once. Pixels outside the canvas are skipped.
    pub fn stroke(&mut self, a: DVec2, b: DVec2, alpha: f64) {
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        for i in 0..steps {
            let p = a + delta * (i as f64 / steps as f64);
            self.deposit(p, alpha);
        }
    }

    fn deposit(&mut self, p: DVec2, alpha: f64) {
        if p.x < 0.0 || p.y < 0.0 {
            return;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if let Some(d) = self.density.get(x, y) {
            self.density.set(x, y, (d + alpha).min(1.0));
        }
    }

    /// Fades by the simulation's `fade` and strokes its current segments
    /// with its `stroke_alpha`.
    pub fn record(&mut self, sim: &Simulation) {
        let settings = sim.settings();
        self.fade(settings.fade);
        for (a, b) in sim.segments() {
            self.stroke(a, b, settings.stroke_alpha);
        }
    }
}
