#![deny(unsafe_code)]
//! Render surface for flowlines: turns particle segments into pixels and
//! images into boundary masks.
//!
//! This crate sits between `flowlines-core` (which moves the particles) and
//! the CLI. [`trails`] and [`pixel`] are pure computation; [`mask`] and
//! [`snapshot`] touch the filesystem through `image` and are gated behind
//! the `png` feature.

pub mod pixel;
pub mod trails;

#[cfg(feature = "png")]
pub mod mask;
#[cfg(feature = "png")]
pub mod snapshot;

pub use pixel::Tint;
pub use trails::TrailCanvas;
