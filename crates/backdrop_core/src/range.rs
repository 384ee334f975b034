//! # Random Ranges
//!
//! Uniform sampling helpers. A decorative visual favors uptime over
//! correctness: a malformed range logs a warning and samples as `0.0`
//! instead of failing the frame.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Creates a deterministic RNG from a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Creates an RNG seeded from operating-system entropy.
#[must_use]
pub fn entropy_rng() -> ChaCha8Rng {
    ChaCha8Rng::from_entropy()
}

/// An inclusive `[min, max]` range sampled uniformly.
///
/// Serialized as a two-element array, e.g. `lifetime = [10.0, 20.0]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct FloatRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl FloatRange {
    /// Creates a range.
    #[inline]
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A degenerate range that always samples `value`.
    #[inline]
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self { min: value, max: value }
    }

    /// Returns true when both endpoints are finite numbers.
    #[inline]
    #[must_use]
    pub fn is_well_formed(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns the value at fraction `t` of the way from `min` to `max`.
    #[inline]
    #[must_use]
    pub fn lerp(self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    /// Draws a uniform value.
    ///
    /// Reversed ranges (`min > max`) sample between the two endpoints all
    /// the same. A range with a non-finite endpoint logs a warning and
    /// yields `0.0`.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f32 {
        if !self.is_well_formed() {
            tracing::warn!(min = self.min, max = self.max, "malformed range, sampling 0.0");
            return 0.0;
        }
        if self.min == self.max {
            return self.min;
        }
        self.lerp(rng.gen::<f32>())
    }
}

impl From<[f32; 2]> for FloatRange {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<FloatRange> for [f32; 2] {
    fn from(range: FloatRange) -> Self {
        [range.min, range.max]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_within_bounds() {
        let mut rng = seeded_rng(7);
        let range = FloatRange::new(2.0, 8.0);
        for _ in 0..1000 {
            let v = range.sample(&mut rng);
            assert!((2.0..=8.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn test_reversed_range_samples_between_endpoints() {
        let mut rng = seeded_rng(11);
        let range = FloatRange::new(2.0, -2.0);
        for _ in 0..1000 {
            let v = range.sample(&mut rng);
            assert!((-2.0..=2.0).contains(&v));
        }
    }

    #[test]
    fn test_constant_range() {
        let mut rng = seeded_rng(1);
        assert_eq!(FloatRange::constant(3.5).sample(&mut rng), 3.5);
    }

    #[test]
    fn test_malformed_range_defaults_to_zero() {
        let mut rng = seeded_rng(1);
        assert_eq!(FloatRange::new(f32::NAN, 1.0).sample(&mut rng), 0.0);
        assert_eq!(FloatRange::new(0.0, f32::INFINITY).sample(&mut rng), 0.0);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let range = FloatRange::new(0.0, 100.0);
        let a: Vec<f32> = {
            let mut rng = seeded_rng(42);
            (0..8).map(|_| range.sample(&mut rng)).collect()
        };
        let b: Vec<f32> = {
            let mut rng = seeded_rng(42);
            (0..8).map(|_| range.sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }
}
