//! Per-frame driver: evolves the flow and advects every particle.
//!
//! A [`Simulation`] owns the composite [`FlowField`], the particles and the
//! PRNG that every random choice is drawn from. The same seed and settings
//! always replay the same frames.

use std::sync::Arc;

use glam::DVec2;
use tracing::debug;

use crate::distance::DistanceField;
use crate::error::FlowError;
use crate::flow::FlowField;
use crate::fractal::FractalFlowField;
use crate::mask::Mask;
use crate::particle::Particle;
use crate::prng::Xorshift64;
use crate::seed::Seed;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct Simulation {
    width: f64,
    height: f64,
    settings: Settings,
    flow: FlowField,
    particles: Vec<Particle>,
    rng: Xorshift64,
    frame: u64,
}

impl Simulation {
    /// Creates a simulation over a `width × height` pixel canvas.
    ///
    /// The noise seed is the first draw from a PRNG seeded with `seed`;
    /// particles are spawned from the following draws. Returns
    /// `FlowError::InvalidDimensions` if either dimension is zero.
    pub fn new(
        width: usize,
        height: usize,
        settings: Settings,
        seed: u64,
    ) -> Result<Self, FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let settings = settings.normalized();
        let mut rng = Xorshift64::new(seed);
        let fractal =
            FractalFlowField::new(rng.next_seed(), settings.noise_scale, settings.octaves);
        let mut flow = FlowField::new(fractal);
        flow.set_sdf_strength(settings.sdf_strength);
        flow.set_sdf_falloff(settings.sdf_falloff);

        let mut sim = Self {
            width: width as f64,
            height: height as f64,
            settings,
            flow,
            particles: Vec::new(),
            rng,
            frame: 0,
        };
        sim.set_particle_count(sim.settings.particle_count);
        Ok(sim)
    }

    /// Creates a simulation from a recorded [`Seed`]. Frames are not run.
    pub fn from_seed(seed: &Seed) -> Result<Self, FlowError> {
        seed.validate()?;
        Self::new(seed.width, seed.height, seed.settings.clone(), seed.seed)
    }

    /// Advances time by `evolution_rate` and moves every particle once.
    pub fn step(&mut self) {
        self.flow.fractal_mut().evolve(self.settings.evolution_rate);
        let flow = &self.flow;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.particles
                .par_iter_mut()
                .for_each(|p| p.integrate(flow));
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.particles.iter_mut().for_each(|p| p.integrate(flow));
        }

        self.frame += 1;
    }

    /// The `(previous, current)` segment of every particle for this frame.
    pub fn segments(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        self.particles.iter().map(Particle::segment)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn flow(&self) -> &FlowField {
        &self.flow
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of completed steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Applies new settings through the clamping setters.
    ///
    /// Speeds are redrawn only when `speed` or `speed_variation` changed.
    /// A new `sdf_resolution` takes effect on the next [`load_mask`].
    ///
    /// [`load_mask`]: Simulation::load_mask
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.normalized();
        let speed_changed = settings.speed != self.settings.speed
            || settings.speed_variation != self.settings.speed_variation;

        let fractal = self.flow.fractal_mut();
        fractal.set_scale(settings.noise_scale);
        fractal.set_octaves(settings.octaves);
        self.flow.set_sdf_strength(settings.sdf_strength);
        self.flow.set_sdf_falloff(settings.sdf_falloff);
        self.settings = settings;

        if speed_changed {
            self.redraw_speeds();
        }
        self.set_particle_count(self.settings.particle_count);
    }

    /// Grows or shrinks the particle set. New particles spawn at random
    /// positions; shrinking drops the most recently added.
    pub fn set_particle_count(&mut self, count: usize) {
        let count = count.min(crate::settings::MAX_PARTICLES);
        if count == self.particles.len() {
            return;
        }
        debug!(from = self.particles.len(), to = count, "resizing particle set");
        if count < self.particles.len() {
            self.particles.truncate(count);
        } else {
            let (w, h) = (self.width, self.height);
            let (speed, variation) = (self.settings.speed, self.settings.speed_variation);
            let start = self.particles.len();
            let rng = &mut self.rng;
            self.particles
                .extend((start..count).map(|_| Particle::spawn(w, h, speed, variation, rng)));
        }
        self.settings.particle_count = count;
    }

    /// Sets base speed and variation, redrawing every particle's offset.
    pub fn set_speed(&mut self, base: f64, variation: f64) {
        let normalized = Settings {
            speed: base,
            speed_variation: variation,
            ..self.settings.clone()
        }
        .normalized();
        self.settings.speed = normalized.speed;
        self.settings.speed_variation = normalized.speed_variation;
        self.redraw_speeds();
    }

    fn redraw_speeds(&mut self) {
        let (base, variation) = (self.settings.speed, self.settings.speed_variation);
        for p in &mut self.particles {
            p.set_speed(base, variation, &mut self.rng);
        }
    }

    /// Changes the wrap bounds of every particle without moving them.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        debug!(width, height, "resizing canvas");
        self.width = width as f64;
        self.height = height as f64;
        for p in &mut self.particles {
            p.set_bounds(self.width, self.height);
        }
        Ok(())
    }

    /// Scatters every particle to a fresh random position.
    pub fn reset_particles(&mut self) {
        for p in &mut self.particles {
            p.reset(&mut self.rng);
        }
    }

    /// Replaces the noise with one built from `seed`, or from a seed drawn
    /// from the simulation PRNG. Returns the seed used.
    pub fn regenerate(&mut self, seed: Option<u32>) -> u32 {
        let fractal = self.flow.fractal_mut();
        match seed {
            Some(seed) => {
                fractal.regenerate(seed);
                seed
            }
            None => fractal.regenerate_from(&mut self.rng),
        }
    }

    /// Grid size a mask must have to cover the canvas at the current
    /// `sdf_resolution`.
    pub fn mask_grid_size(&self) -> (usize, usize) {
        DistanceField::grid_size(self.width, self.height, self.settings.sdf_resolution)
    }

    /// Builds a distance field from `mask` and attaches it.
    ///
    /// `mask` must be exactly [`mask_grid_size`] cells, otherwise this
    /// returns `FlowError::MaskSize`. On any failure a previously attached
    /// field is detached, so the flow falls back to undeflected noise.
    ///
    /// [`mask_grid_size`]: Simulation::mask_grid_size
    pub fn load_mask(&mut self, mask: &Mask) -> Result<(), FlowError> {
        let (expected_width, expected_height) = self.mask_grid_size();
        let built = if (mask.width(), mask.height()) != (expected_width, expected_height) {
            Err(FlowError::MaskSize {
                width: mask.width(),
                height: mask.height(),
                expected_width,
                expected_height,
            })
        } else {
            DistanceField::from_mask(mask, self.settings.sdf_resolution)
                .and_then(|field| self.flow.attach_distance_field(Arc::new(field)))
        };
        if built.is_err() {
            self.flow.detach_distance_field();
        }
        built
    }

    /// Detaches the distance field.
    pub fn clear_mask(&mut self) {
        self.flow.detach_distance_field();
    }

    pub fn has_mask(&self) -> bool {
        self.flow.distance_field().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FlowSource;

    fn small_settings() -> Settings {
        Settings {
            particle_count: 200,
            ..Settings::default()
        }
    }

    fn sim(seed: u64) -> Simulation {
        Simulation::new(320, 240, small_settings(), seed).unwrap()
    }

    fn positions(sim: &Simulation) -> Vec<(u64, u64)> {
        sim.particles()
            .iter()
            .map(|p| (p.position().x.to_bits(), p.position().y.to_bits()))
            .collect()
    }

    // -- Construction --

    #[test]
    fn new_spawns_requested_particles_in_bounds() {
        let s = sim(1);
        assert_eq!(s.particles().len(), 200);
        for p in s.particles() {
            let pos = p.position();
            assert!((0.0..320.0).contains(&pos.x) && (0.0..240.0).contains(&pos.y));
            assert_eq!(p.previous(), pos);
        }
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Simulation::new(0, 10, small_settings(), 1),
            Err(FlowError::InvalidDimensions)
        ));
    }

    #[test]
    fn from_seed_matches_new() {
        let mut record = Seed::new(320, 240, 9);
        record.settings = small_settings();
        let a = Simulation::from_seed(&record).unwrap();
        let b = sim(9);
        assert_eq!(positions(&a), positions(&b));
    }

    // -- Stepping --

    #[test]
    fn same_seed_same_frames() {
        let mut a = sim(42);
        let mut b = sim(42);
        for _ in 0..25 {
            a.step();
            b.step();
        }
        assert_eq!(positions(&a), positions(&b));
        assert_eq!(a.frame(), 25);
    }

    #[test]
    fn different_seeds_diverge() {
        assert_ne!(positions(&sim(1)), positions(&sim(2)));
    }

    #[test]
    fn step_advances_time_and_moves_particles() {
        let mut s = sim(3);
        let before = positions(&s);
        s.step();
        let z = s.flow().fractal().z_offset();
        assert!((z - s.settings().evolution_rate).abs() < 1e-15);
        assert_ne!(before, positions(&s));
    }

    #[test]
    fn segments_pair_previous_and_current() {
        let mut s = sim(4);
        s.step();
        for ((prev, cur), p) in s.segments().zip(s.particles()) {
            assert_eq!(prev, p.previous());
            assert_eq!(cur, p.position());
        }
    }

    #[test]
    fn segments_never_span_half_the_canvas() {
        let mut s = sim(5);
        s.set_speed(12.0, 0.0);
        for _ in 0..60 {
            s.step();
            for (prev, cur) in s.segments() {
                assert!((cur.x - prev.x).abs() <= 160.0);
                assert!((cur.y - prev.y).abs() <= 120.0);
            }
        }
    }

    // -- Configuration --

    #[test]
    fn set_particle_count_grows_and_shrinks() {
        let mut s = sim(6);
        s.set_particle_count(350);
        assert_eq!(s.particles().len(), 350);
        s.set_particle_count(10);
        assert_eq!(s.particles().len(), 10);
        assert_eq!(s.settings().particle_count, 10);
    }

    #[test]
    fn apply_settings_clamps_through_setters() {
        let mut s = sim(7);
        s.apply_settings(Settings {
            octaves: 40,
            sdf_strength: 7.0,
            sdf_falloff: 0.0,
            particle_count: 50,
            ..small_settings()
        });
        assert_eq!(s.flow().fractal().octaves(), 8);
        assert_eq!(s.flow().sdf_strength(), 2.0);
        assert_eq!(s.flow().sdf_falloff(), 1.0);
        assert_eq!(s.particles().len(), 50);
    }

    #[test]
    fn set_speed_redraws_offsets() {
        let mut s = sim(8);
        s.set_speed(4.0, 1.0);
        assert!(s.particles().iter().all(|p| (3.0..5.0).contains(&p.speed())));
    }

    #[test]
    fn resize_keeps_positions() {
        let mut s = sim(10);
        let before = positions(&s);
        s.resize(100, 100).unwrap();
        assert_eq!(before, positions(&s));
        assert!(s.particles().iter().all(|p| p.bounds() == (100.0, 100.0)));
        assert!(s.resize(0, 5).is_err());
    }

    #[test]
    fn reset_particles_moves_everyone() {
        let mut s = sim(12);
        let before = positions(&s);
        s.reset_particles();
        assert_ne!(before, positions(&s));
    }

    #[test]
    fn regenerate_with_seed_is_reproducible() {
        let mut a = sim(13);
        let mut b = sim(14);
        a.step();
        assert_eq!(a.regenerate(Some(42)), 42);
        assert_eq!(b.regenerate(Some(42)), 42);
        for i in 0..20 {
            let (x, y) = (i as f64 * 13.0, i as f64 * 7.0);
            assert_eq!(
                a.flow().fractal().angle_at(x, y).to_bits(),
                b.flow().fractal().angle_at(x, y).to_bits()
            );
        }
    }

    #[test]
    fn regenerate_without_seed_draws_from_rng() {
        let mut a = sim(15);
        let mut b = sim(15);
        assert_eq!(a.regenerate(None), b.regenerate(None));
    }

    // -- Masks --

    #[test]
    fn load_mask_attaches_field() {
        let mut s = sim(16);
        let (w, h) = s.mask_grid_size();
        assert_eq!((w, h), (80, 60));
        let mask = Mask::from_fn(w, h, |x, y| (30..50).contains(&x) && (20..40).contains(&y))
            .unwrap();
        s.load_mask(&mask).unwrap();
        assert!(s.has_mask());
        let d = s.flow().distance_field().unwrap().distance(160.0, 120.0);
        assert!(d < 0.0, "canvas center should be inside the mask, got {d}");
    }

    #[test]
    fn failed_load_detaches_previous_field() {
        let mut s = sim(17);
        let (w, h) = s.mask_grid_size();
        s.load_mask(&Mask::from_fn(w, h, |x, _| x > 40).unwrap()).unwrap();
        assert!(s.load_mask(&Mask::new(0, 0).unwrap()).is_err());
        assert!(!s.has_mask());
    }

    #[test]
    fn canvas_sized_mask_is_rejected() {
        let mut s = sim(19);
        let (w, h) = s.mask_grid_size();
        s.load_mask(&Mask::from_fn(w, h, |x, _| x > 40).unwrap()).unwrap();

        let full = Mask::from_fn(320, 240, |x, y| {
            (120..200).contains(&x) && (80..160).contains(&y)
        })
        .unwrap();
        assert!(matches!(
            s.load_mask(&full),
            Err(FlowError::MaskSize {
                width: 320,
                height: 240,
                expected_width: 80,
                expected_height: 60,
            })
        ));
        assert!(!s.has_mask());
    }

    #[test]
    fn mask_grid_follows_resolution() {
        let mut s = Simulation::new(
            320,
            240,
            Settings {
                sdf_resolution: 2.0,
                ..small_settings()
            },
            20,
        )
        .unwrap();
        assert_eq!(s.mask_grid_size(), (160, 120));
        assert!(s.load_mask(&Mask::new(80, 60).unwrap()).is_err());
        s.load_mask(&Mask::new(160, 120).unwrap()).unwrap();
        assert!(s.has_mask());
    }

    #[test]
    fn clear_mask_restores_plain_noise() {
        let mut s = sim(18);
        let (w, h) = s.mask_grid_size();
        s.load_mask(&Mask::from_fn(w, h, |x, _| x > 40).unwrap()).unwrap();
        s.clear_mask();
        let v = s.flow().vector_at(200.0, 100.0);
        assert_eq!(v, s.flow().fractal().vector_at(200.0, 100.0));
    }
}
