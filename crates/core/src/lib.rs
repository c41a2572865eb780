#![deny(unsafe_code)]
//! Core of the flowlines particle-flow system.
//!
//! Provides seeded simplex noise (`NoiseField`), the fractal angle field
//! (`FractalFlowField`), the boolean `Mask` and its signed `DistanceField`,
//! the composite `FlowField` that deflects noise around a boundary,
//! toroidally wrapped `Particle`s, and the `Simulation` driver with its
//! `Settings`, presets and reproducible `Seed` records.

pub mod distance;
pub mod error;
pub mod flow;
pub mod fractal;
pub mod grid;
pub mod mask;
pub mod particle;
pub mod prng;
pub mod seed;
pub mod settings;
pub mod simplex;
pub mod simulation;
pub mod source;

pub use distance::DistanceField;
pub use error::FlowError;
pub use flow::FlowField;
pub use fractal::FractalFlowField;
pub use grid::Grid;
pub use mask::Mask;
pub use particle::Particle;
pub use prng::Xorshift64;
pub use seed::Seed;
pub use settings::Settings;
pub use simplex::NoiseField;
pub use simulation::Simulation;
pub use source::{FlowSource, UniformFlow};
