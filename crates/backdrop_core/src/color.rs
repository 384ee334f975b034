//! # Packed RGB Color
//!
//! Tints travel through the engine as `0xRRGGBB` integers, the format the
//! renderer's tint slot expects. Interpolation happens per channel in
//! 0-255 integer space.

use serde::{Deserialize, Serialize};

/// A packed `0xRRGGBB` color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Rgb(u32);

impl Rgb {
    /// Pure white, the neutral tint.
    pub const WHITE: Self = Self(0x00FF_FFFF);
    /// Pure black.
    pub const BLACK: Self = Self(0);

    /// Creates a color from a packed value. Bits above 24 are dropped.
    #[inline]
    #[must_use]
    pub const fn new(packed: u32) -> Self {
        Self(packed & 0x00FF_FFFF)
    }

    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Returns the packed `0xRRGGBB` value.
    #[inline]
    #[must_use]
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Red channel.
    #[inline]
    #[must_use]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Green channel.
    #[inline]
    #[must_use]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Blue channel.
    #[inline]
    #[must_use]
    pub const fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Linearly interpolates toward `other`, rounding each channel.
    ///
    /// Halfway values round away from zero, so `0xFF0000 -> 0x0000FF` at
    /// `t = 0.5` yields `0x800080`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::from_channels(
            lerp_channel(self.r(), other.r(), t),
            lerp_channel(self.g(), other.g(), t),
            lerp_channel(self.b(), other.b(), t),
        )
    }

    /// Returns the channels normalized to 0.0-1.0.
    #[must_use]
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r()) / 255.0,
            f32::from(self.g()) / 255.0,
            f32::from(self.b()) / 255.0,
        ]
    }
}

impl From<u32> for Rgb {
    fn from(packed: u32) -> Self {
        Self::new(packed)
    }
}

impl From<Rgb> for u32 {
    fn from(color: Rgb) -> Self {
        color.packed()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let a = f32::from(a);
    let b = f32::from(b);
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_roundtrip() {
        let c = Rgb::from_channels(0x12, 0x34, 0x56);
        assert_eq!(c.packed(), 0x0012_3456);
        assert_eq!((c.r(), c.g(), c.b()), (0x12, 0x34, 0x56));
    }

    #[test]
    fn test_deserialize_masks_high_bits() {
        #[derive(Deserialize)]
        struct Tint {
            color: Rgb,
        }
        let tint: Tint = toml::from_str("color = 0x1FF0000").unwrap();
        assert_eq!(tint.color.packed(), 0x00FF_0000);
        assert_eq!(tint.color.r(), 0xFF);
    }

    #[test]
    fn test_new_masks_high_bits() {
        assert_eq!(Rgb::new(0xFF12_3456).packed(), 0x0012_3456);
    }

    #[test]
    fn test_lerp_midpoint_rounds_half_up() {
        let mid = Rgb::new(0xFF_0000).lerp(Rgb::new(0x00_00FF), 0.5);
        assert_eq!(mid.packed(), 0x80_0080);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(0x10_2030);
        let b = Rgb::new(0xF0_E0D0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_to_unit() {
        assert_eq!(Rgb::WHITE.to_unit(), [1.0, 1.0, 1.0]);
        assert_eq!(Rgb::BLACK.to_unit(), [0.0, 0.0, 0.0]);
    }
}
