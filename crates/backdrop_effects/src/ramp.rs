//! # Ramps
//!
//! Piecewise-linear curves over a particle's normalized lifetime.
//!
//! A ramp maps normalized times (`0.0` = birth, `1.0` = death) to values.
//! Keys need not be evenly spaced; sampling clamps outside the key span and
//! interpolates linearly between the bracketing pair inside it.
//!
//! ```text
//!   value
//!     4 |        *
//!       |       / \
//!       |      /   \
//!     0 |*----*     *-----*
//!       +--------------------> t
//!        0   0.3 0.5 0.7   1
//! ```
//!
//! Ramps are typed: [`ScalarRamp`] interpolates in floating point,
//! [`ColorRamp`] interpolates each RGB channel in 0-255 space with
//! rounding. [`UntypedRamp`] exists for raw numeric input whose kind has
//! to be guessed from magnitude.
//!
//! ## Config syntax
//!
//! ```toml
//! alpha = [1.0, 0.0]                                   # shorthand for { 0 = 1.0, 1 = 0.0 }
//! scale = { "0.0" = 0.1, "0.5" = 0.3, "1.0" = 0.1 }   # keyed (keys must be quoted)
//! color = { "0.45" = 0x000000, "0.5" = 0xffff00 }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use backdrop_core::Rgb;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{EffectsError, EffectsResult};

/// A value a ramp can interpolate.
pub trait RampValue: Copy {
    /// Interpolates from `a` to `b` at `t` in [0, 1].
    fn lerp(a: Self, b: Self, t: f32) -> Self;
}

impl RampValue for f32 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl RampValue for f64 {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * f64::from(t)
    }
}

impl RampValue for Rgb {
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

/// One key of a ramp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RampKey<V> {
    /// Normalized time in [0, 1].
    pub time: f32,
    /// Value at `time`.
    pub value: V,
}

/// Where a sample time falls on a ramp.
enum Span<V> {
    /// Clamped to a single key.
    At(V),
    /// Between two keys, `t` local to the pair.
    Between(V, V, f32),
}

/// A piecewise-linear curve with at least one key, sorted by time.
#[derive(Clone, Debug, PartialEq)]
pub struct Ramp<V> {
    keys: Vec<RampKey<V>>,
}

/// Ramp over plain numbers (scale, alpha, light energy).
pub type ScalarRamp = Ramp<f32>;
/// Ramp over packed RGB colors (tint, light hue).
pub type ColorRamp = Ramp<Rgb>;

impl<V: RampValue> Ramp<V> {
    /// Builds a ramp from `(time, value)` pairs in any order.
    ///
    /// Keys are sorted ascending. When two keys share a time the later one
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::EmptyRamp`] for no keys and
    /// [`EffectsError::InvalidRampKey`] for a time that is not a finite
    /// number in [0, 1].
    pub fn new<I>(keys: I) -> EffectsResult<Self>
    where
        I: IntoIterator<Item = (f32, V)>,
    {
        let mut sorted: Vec<RampKey<V>> = Vec::new();
        for (time, value) in keys {
            if !time.is_finite() || !(0.0..=1.0).contains(&time) {
                return Err(EffectsError::InvalidRampKey { key: time.to_string() });
            }
            sorted.push(RampKey { time, value });
        }
        if sorted.is_empty() {
            return Err(EffectsError::EmptyRamp);
        }

        sorted.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut keys: Vec<RampKey<V>> = Vec::with_capacity(sorted.len());
        for key in sorted {
            match keys.last_mut() {
                Some(last) if last.time == key.time => last.value = key.value,
                _ => keys.push(key),
            }
        }

        Ok(Self { keys })
    }

    /// The two-element shorthand `[start, end]`, i.e. `{0: start, 1: end}`.
    #[must_use]
    pub fn linear(start: V, end: V) -> Self {
        Self {
            keys: vec![
                RampKey { time: 0.0, value: start },
                RampKey { time: 1.0, value: end },
            ],
        }
    }

    /// A ramp that holds `value` for the whole lifetime.
    #[must_use]
    pub fn constant(value: V) -> Self {
        Self {
            keys: vec![RampKey { time: 0.0, value }],
        }
    }

    /// Returns the sorted keys.
    #[must_use]
    pub fn keys(&self) -> &[RampKey<V>] {
        &self.keys
    }

    /// Samples the ramp at normalized time `t`.
    ///
    /// - `t` at or before the first key returns the first value.
    /// - `t` at or after the last key returns the last value.
    /// - Otherwise the first bracketing pair found scanning upward is
    ///   interpolated.
    #[must_use]
    pub fn sample(&self, t: f32) -> V {
        match self.span(t) {
            Span::At(v) => v,
            Span::Between(a, b, local_t) => V::lerp(a, b, local_t),
        }
    }

    fn span(&self, t: f32) -> Span<V> {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];

        if t <= first.time {
            return Span::At(first.value);
        }
        if t >= last.time {
            return Span::At(last.value);
        }

        for pair in self.keys.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t >= lo.time && t <= hi.time {
                let local_t = (t - lo.time) / (hi.time - lo.time);
                return Span::Between(lo.value, hi.value, local_t);
            }
        }

        // Only reachable for NaN.
        Span::At(last.value)
    }
}

/// Interpretation of a raw numeric ramp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RampKind {
    /// Plain floating-point values.
    Scalar,
    /// Packed `0xRRGGBB` colors.
    Color,
}

impl RampKind {
    /// Guesses the kind of a bracketing pair from magnitude.
    ///
    /// Anything above `0xFF` must encode more than one byte, so it is read
    /// as a packed color. A byte-range scalar ramp (e.g. alpha in 0-255)
    /// therefore always reads as `Scalar`, and a color ramp whose pair is
    /// entirely `<= 0xFF` (pure blues) reads as `Scalar` too. Prefer typed
    /// ramps wherever the kind is known.
    #[must_use]
    pub fn infer(v0: f64, v1: f64) -> Self {
        if v0 > 255.0 || v1 > 255.0 {
            Self::Color
        } else {
            Self::Scalar
        }
    }
}

/// A numeric ramp whose kind is decided per bracketing pair at sample time.
#[derive(Clone, Debug, PartialEq)]
pub struct UntypedRamp(Ramp<f64>);

impl UntypedRamp {
    /// Wraps raw keys.
    ///
    /// # Errors
    ///
    /// Same as [`Ramp::new`].
    pub fn new<I>(keys: I) -> EffectsResult<Self>
    where
        I: IntoIterator<Item = (f32, f64)>,
    {
        Ramp::new(keys).map(Self)
    }

    /// Samples at `t`, interpolating as a color when [`RampKind::infer`]
    /// says the bracketing pair holds colors.
    #[must_use]
    pub fn sample(&self, t: f32) -> f64 {
        match self.0.span(t) {
            Span::At(v) => v,
            Span::Between(a, b, local_t) => match RampKind::infer(a, b) {
                RampKind::Scalar => f64::lerp(a, b, local_t),
                RampKind::Color => {
                    let lerped = Rgb::new(to_packed(a)).lerp(Rgb::new(to_packed(b)), local_t);
                    f64::from(lerped.packed())
                }
            },
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_packed(value: f64) -> u32 {
    value.clamp(0.0, f64::from(u32::MAX)) as u32
}

// ============================================================================
// Serde
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RampRepr<V> {
    Pair([V; 2]),
    Keyed(BTreeMap<String, V>),
}

fn parse_key(key: &str) -> EffectsResult<f32> {
    key.trim()
        .parse::<f32>()
        .map_err(|_| EffectsError::InvalidRampKey { key: key.to_string() })
}

impl<V: RampValue> TryFrom<RampRepr<V>> for Ramp<V> {
    type Error = EffectsError;

    fn try_from(repr: RampRepr<V>) -> EffectsResult<Self> {
        match repr {
            RampRepr::Pair([start, end]) => Ok(Self::linear(start, end)),
            RampRepr::Keyed(map) => {
                let keys = map
                    .into_iter()
                    .map(|(key, value)| parse_key(&key).map(|time| (time, value)))
                    .collect::<EffectsResult<Vec<_>>>()?;
                Self::new(keys)
            }
        }
    }
}

impl<'de, V> Deserialize<'de> for Ramp<V>
where
    V: RampValue + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = RampRepr::<V>::deserialize(deserializer)?;
        Self::try_from(repr).map_err(serde::de::Error::custom)
    }
}

impl<V> Serialize for Ramp<V>
where
    V: RampValue + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for key in &self.keys {
            map.serialize_entry(&KeyTime(key.time).to_string(), &key.value)?;
        }
        map.end()
    }
}

/// Formats a key time so it always reads back as a float ("1.0", not "1").
struct KeyTime(f32);

impl fmt::Display for KeyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
