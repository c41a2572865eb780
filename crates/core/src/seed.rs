//! Reproducible record of a rendered run.
//!
//! A [`Seed`] holds everything needed to replay a simulation bit for bit:
//! canvas size, settings, PRNG seed, frame count and the mask source, if any.

use crate::error::FlowError;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub settings: Settings,
    pub seed: u64,
    #[serde(default)]
    pub frames: usize,
    /// Where the boundary mask came from, for example an image path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
}

impl Seed {
    /// Creates a record with default settings, zero frames and no mask.
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self {
            width,
            height,
            settings: Settings::default(),
            seed,
            frames: 0,
            mask: None,
        }
    }

    /// Checks for non-zero dimensions whose product fits in `usize`.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.width == 0 || self.height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(FlowError::InvalidDimensions)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let s = Seed::new(640, 480, 42);
        assert_eq!(s.width, 640);
        assert_eq!(s.height, 480);
        assert_eq!(s.seed, 42);
        assert_eq!(s.frames, 0);
        assert_eq!(s.settings, Settings::default());
        assert!(s.mask.is_none());
    }

    #[test]
    fn json_round_trip_with_mask_and_preset() {
        let mut s = Seed::new(1024, 768, 8675309);
        s.settings = Settings::preset("contour").unwrap();
        s.frames = 600;
        s.mask = Some("shapes/heart.png".into());
        let json = serde_json::to_string_pretty(&s).unwrap();
        let restored: Seed = serde_json::from_str(&json).unwrap();
        assert_eq!(s, restored);
    }

    #[test]
    fn mask_is_omitted_when_absent() {
        let v = serde_json::to_value(Seed::new(8, 8, 1)).unwrap();
        assert!(v.get("mask").is_none());
        assert!(v.get("settings").is_some());
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let s: Seed = serde_json::from_str(r#"{"width": 10, "height": 20, "seed": 3}"#).unwrap();
        assert_eq!(s.frames, 0);
        assert_eq!(s.settings, Settings::default());
    }

    #[test]
    fn validate_rejects_zero_and_overflow() {
        assert!(Seed::new(64, 64, 1).validate().is_ok());
        assert!(Seed::new(0, 64, 1).validate().is_err());
        assert!(Seed::new(64, 0, 1).validate().is_err());
        assert!(Seed::new(usize::MAX, 2, 1).validate().is_err());
    }
}
