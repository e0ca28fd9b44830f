//! Transform mapping
//!
//! Piecewise-linear, clamped mapping from a signal value to an output value
//! (offset, scale, rotation, opacity, blur).
//!
//! ```
//! use kinetic_animation::{map_range, TransformMapper};
//!
//! assert_eq!(map_range(250.0, [0.0, 500.0], [0.0, 150.0]), 75.0);
//! assert_eq!(map_range(900.0, [0.0, 500.0], [0.0, 150.0]), 150.0);
//!
//! let breathe = TransformMapper::piecewise(&[0.0, 0.5, 1.0], &[1.05, 1.0, 1.05]).unwrap();
//! assert_eq!(breathe.map(0.5), 1.0);
//! ```

use kinetic_core::{MotionError, Result};
use serde::Serialize;
use smallvec::SmallVec;

/// Map `value` linearly from `domain` to `range`, clamped to the range
///
/// A degenerate domain (`d0 == d1`) maps everything below or at `d0` to
/// `r0` and everything above to `r1`. NaN maps to `r0`.
pub fn map_range(value: f32, domain: [f32; 2], range: [f32; 2]) -> f32 {
    let [d0, d1] = domain;
    let [r0, r1] = range;

    if value.is_nan() {
        return r0;
    }

    let span = d1 - d0;
    if span.abs() < f32::EPSILON {
        return if value <= d0 { r0 } else { r1 };
    }

    let t = ((value - d0) / span).clamp(0.0, 1.0);
    r0 + (r1 - r0) * t
}

/// Clamped piecewise-linear mapping with at least two stops
#[derive(Clone, Debug, PartialEq)]
pub struct TransformMapper {
    domain: SmallVec<[f32; 4]>,
    range: SmallVec<[f32; 4]>,
}

impl TransformMapper {
    /// Two-stop linear mapping
    pub fn linear(domain: [f32; 2], range: [f32; 2]) -> Result<Self> {
        Self::piecewise(&domain, &range)
    }

    /// N-stop mapping
    ///
    /// Fails unless both lists have the same length of at least two, every
    /// stop is finite and the domain is non-decreasing.
    pub fn piecewise(domain: &[f32], range: &[f32]) -> Result<Self> {
        if domain.len() != range.len() {
            return Err(MotionError::InvalidMapping(format!(
                "{} domain stops but {} range stops",
                domain.len(),
                range.len()
            )));
        }
        if domain.len() < 2 {
            return Err(MotionError::InvalidMapping(
                "at least two stops are required".to_string(),
            ));
        }
        if domain.iter().chain(range).any(|stop| !stop.is_finite()) {
            return Err(MotionError::InvalidMapping(
                "stops must be finite".to_string(),
            ));
        }
        if domain.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(MotionError::InvalidMapping(
                "domain must be non-decreasing".to_string(),
            ));
        }

        Ok(Self {
            domain: domain.iter().copied().collect(),
            range: range.iter().copied().collect(),
        })
    }

    /// Map a constant: every input yields `value`
    pub fn constant(value: f32) -> Self {
        Self {
            domain: SmallVec::from_slice(&[0.0, 1.0]),
            range: SmallVec::from_slice(&[value, value]),
        }
    }

    /// Map a signal value; clamped to the first and last range stops
    pub fn map(&self, value: f32) -> f32 {
        let last = self.domain.len() - 1;
        if value.is_nan() || value <= self.domain[0] {
            return self.range[0];
        }
        if value >= self.domain[last] {
            return self.range[last];
        }

        // First segment whose upper stop reaches the value
        let upper = self
            .domain
            .iter()
            .position(|stop| *stop >= value)
            .unwrap_or(last)
            .max(1);
        map_range(
            value,
            [self.domain[upper - 1], self.domain[upper]],
            [self.range[upper - 1], self.range[upper]],
        )
    }

    /// Output for a signal at rest
    pub fn rest_value(&self, neutral: f32) -> f32 {
        self.map(neutral)
    }

    pub fn domain(&self) -> &[f32] {
        &self.domain
    }

    pub fn range(&self) -> &[f32] {
        &self.range
    }
}

/// A grouped set of transform outputs with identity defaults
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TransformSet {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
    pub rotate: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub opacity: f32,
    pub blur: f32,
}

impl TransformSet {
    pub const IDENTITY: TransformSet = TransformSet {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
        rotate: 0.0,
        rotate_x: 0.0,
        rotate_y: 0.0,
        opacity: 1.0,
        blur: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for TransformSet {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range_clamps() {
        assert_eq!(map_range(-10.0, [0.0, 300.0], [0.5, 1.0]), 0.5);
        assert_eq!(map_range(150.0, [0.0, 300.0], [0.5, 1.0]), 0.75);
        assert_eq!(map_range(10_000.0, [0.0, 300.0], [0.5, 1.0]), 1.0);
    }

    #[test]
    fn test_map_range_inverted_range() {
        assert_eq!(map_range(0.0, [0.0, 1.0], [100.0, -100.0]), 100.0);
        assert_eq!(map_range(0.5, [0.0, 1.0], [100.0, -100.0]), 0.0);
        assert_eq!(map_range(2.0, [0.0, 1.0], [100.0, -100.0]), -100.0);
    }

    #[test]
    fn test_map_range_degenerate() {
        assert_eq!(map_range(0.0, [1.0, 1.0], [0.0, 10.0]), 0.0);
        assert_eq!(map_range(2.0, [1.0, 1.0], [0.0, 10.0]), 10.0);
        assert_eq!(map_range(f32::NAN, [0.0, 1.0], [3.0, 4.0]), 3.0);
    }

    #[test]
    fn test_piecewise() {
        let mapper = TransformMapper::piecewise(&[0.0, 0.5, 1.0], &[1.05, 1.0, 1.05]).unwrap();
        assert_eq!(mapper.map(0.0), 1.05);
        assert_eq!(mapper.map(0.5), 1.0);
        assert!((mapper.map(0.25) - 1.025).abs() < 1e-6);
        assert!((mapper.map(0.75) - 1.025).abs() < 1e-6);
        assert_eq!(mapper.map(1.0), 1.05);
    }

    #[test]
    fn test_clamps_outside_domain() {
        let mapper = TransformMapper::linear([-0.5, 0.5], [-20.0, 20.0]).unwrap();
        assert_eq!(mapper.map(-3.0), -20.0);
        assert_eq!(mapper.map(3.0), 20.0);
        assert_eq!(mapper.map(f32::NAN), -20.0);
        assert_eq!(mapper.rest_value(0.0), 0.0);
    }

    #[test]
    fn test_repeated_stop() {
        let mapper = TransformMapper::piecewise(&[0.0, 0.5, 0.5, 1.0], &[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(mapper.map(0.25), 0.5);
        assert_eq!(mapper.map(0.75), 2.5);
    }

    #[test]
    fn test_validation() {
        assert!(TransformMapper::piecewise(&[0.0], &[1.0]).is_err());
        assert!(TransformMapper::piecewise(&[0.0, 1.0], &[1.0]).is_err());
        assert!(TransformMapper::piecewise(&[1.0, 0.0], &[0.0, 1.0]).is_err());
        assert!(TransformMapper::piecewise(&[0.0, f32::INFINITY], &[0.0, 1.0]).is_err());
    }

    #[test]
    fn test_transform_set_identity() {
        assert!(TransformSet::default().is_identity());
        let moved = TransformSet {
            translate_y: 4.0,
            ..TransformSet::IDENTITY
        };
        assert!(!moved.is_identity());
    }
}
