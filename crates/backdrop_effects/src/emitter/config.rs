//! Emitter configuration.

use std::f32::consts::TAU;
use std::path::Path;

use backdrop_core::{BlendMode, FloatRange, Rgb, TextureHandle, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{self, Validate};
use crate::error::{EffectsError, EffectsResult};
use crate::ramp::{ColorRamp, ScalarRamp};

/// Where new particles appear, relative to the emitter's container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpawnArea {
    /// Every particle starts at the origin.
    Point,
    /// Uniform over `[0, width) x [0, height)`.
    Rect {
        /// Extent along x.
        width: f32,
        /// Extent along y.
        height: f32,
    },
    /// Uniform radius and uniform angle around the origin.
    ///
    /// Sampling the radius uniformly clusters particles toward the center;
    /// this is intentional for glow fields.
    Circle {
        /// Outer radius.
        radius: f32,
    },
}

impl SpawnArea {
    /// Draws a spawn position.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Vec2 {
        match self {
            Self::Point => Vec2::ZERO,
            Self::Rect { width, height } => Vec2::new(
                FloatRange::new(0.0, width).sample(rng),
                FloatRange::new(0.0, height).sample(rng),
            ),
            Self::Circle { radius } => {
                let r = FloatRange::new(0.0, radius).sample(rng);
                let angle = FloatRange::new(0.0, TAU).sample(rng);
                Vec2::from_polar(r, angle)
            }
        }
    }

    /// Axis-aligned bounds `(min, max)` covering the area.
    #[must_use]
    pub fn bounds(self) -> (Vec2, Vec2) {
        match self {
            Self::Point => (Vec2::ZERO, Vec2::ZERO),
            Self::Rect { width, height } => (Vec2::ZERO, Vec2::new(width, height)),
            Self::Circle { radius } => (Vec2::splat(-radius), Vec2::splat(radius)),
        }
    }

    fn validate(self) -> EffectsResult<()> {
        let (min, max) = self.bounds();
        let dims = [max.x - min.x, max.y - min.y];
        if dims.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(EffectsError::InvalidConfig(format!(
                "spawn area {self:?} needs finite, non-negative dimensions"
            )));
        }
        Ok(())
    }
}

impl Default for SpawnArea {
    fn default() -> Self {
        Self::Rect {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// Initial velocity in polar form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Speed in units per second.
    pub speed: FloatRange,
    /// Direction in radians.
    pub angle: FloatRange,
}

impl VelocityConfig {
    /// Draws a Cartesian velocity.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> Vec2 {
        let speed = self.speed.sample(rng);
        let angle = self.angle.sample(rng);
        Vec2::from_polar(speed, angle)
    }
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            speed: FloatRange::constant(0.0),
            angle: FloatRange::new(0.0, TAU),
        }
    }
}

/// Optional secondary glow that follows each particle.
///
/// Lights always composite additively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Texture for the glow.
    pub texture: TextureHandle,
    /// Scale over lifetime.
    pub scale: ScalarRamp,
    /// Brightness over lifetime, applied as alpha.
    pub energy: ScalarRamp,
    /// Tint over lifetime.
    pub hue: ColorRamp,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            texture: TextureHandle::WHITE,
            scale: ScalarRamp::constant(1.0),
            energy: ScalarRamp::constant(1.0),
            hue: ColorRamp::constant(Rgb::WHITE),
        }
    }
}

/// Full description of a particle emitter.
///
/// # Example
///
/// ```rust
/// use backdrop_core::FloatRange;
/// use backdrop_effects::{EmitterConfig, ScalarRamp};
///
/// let config = EmitterConfig::default()
///     .with_max_particles(40)
///     .with_lifetime(FloatRange::new(15.0, 25.0))
///     .with_alpha(ScalarRamp::linear(1.0, 0.0));
/// assert!(config.validated().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Pool capacity and number of scheduling slots.
    pub max_particles: u32,
    /// Lifetime in seconds, drawn per particle. `lifetime.max` is also the
    /// schedule's cycle length.
    pub lifetime: FloatRange,
    /// Fraction of the pool spawned on start; also compresses the phase
    /// window (1.0 puts every slot at phase 0).
    pub explosiveness: f32,
    /// Per-slot phase jitter, in slots.
    pub randomness: f32,
    /// Spawn area.
    pub spawn_area: SpawnArea,
    /// Initial velocity.
    pub initial_velocity: VelocityConfig,
    /// Constant acceleration.
    pub acceleration: Vec2,
    /// Fractional velocity decay per second.
    pub damping: f32,
    /// Scale over lifetime.
    pub scale: ScalarRamp,
    /// Alpha over lifetime.
    pub alpha: ScalarRamp,
    /// Tint over lifetime.
    pub color: ColorRamp,
    /// Angular velocity in radians per second, drawn once per particle.
    pub rotation_speed: FloatRange,
    /// Initial rotation in radians.
    pub spin: FloatRange,
    /// Texture for every particle.
    pub texture: TextureHandle,
    /// Compositing mode for every particle.
    pub blend_mode: BlendMode,
    /// Optional per-particle glow.
    pub light: Option<LightConfig>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_particles: 100,
            lifetime: FloatRange::new(1.0, 2.0),
            explosiveness: 0.0,
            randomness: 0.0,
            spawn_area: SpawnArea::default(),
            initial_velocity: VelocityConfig::default(),
            acceleration: Vec2::ZERO,
            damping: 0.0,
            scale: ScalarRamp::constant(1.0),
            alpha: ScalarRamp::constant(1.0),
            color: ColorRamp::constant(Rgb::WHITE),
            rotation_speed: FloatRange::constant(0.0),
            spin: FloatRange::constant(0.0),
            texture: TextureHandle::WHITE,
            blend_mode: BlendMode::Normal,
            light: None,
        }
    }
}

impl EmitterConfig {
    /// Sets the pool capacity.
    #[must_use]
    pub fn with_max_particles(mut self, max_particles: u32) -> Self {
        self.max_particles = max_particles;
        self
    }

    /// Sets the lifetime range.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: FloatRange) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sets the explosiveness.
    #[must_use]
    pub fn with_explosiveness(mut self, explosiveness: f32) -> Self {
        self.explosiveness = explosiveness;
        self
    }

    /// Sets the phase jitter.
    #[must_use]
    pub fn with_randomness(mut self, randomness: f32) -> Self {
        self.randomness = randomness;
        self
    }

    /// Sets the spawn area.
    #[must_use]
    pub fn with_spawn_area(mut self, spawn_area: SpawnArea) -> Self {
        self.spawn_area = spawn_area;
        self
    }

    /// Sets the initial speed and direction ranges.
    #[must_use]
    pub fn with_velocity(mut self, speed: FloatRange, angle: FloatRange) -> Self {
        self.initial_velocity = VelocityConfig { speed, angle };
        self
    }

    /// Sets the constant acceleration.
    #[must_use]
    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Sets the damping.
    #[must_use]
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Sets the scale ramp.
    #[must_use]
    pub fn with_scale(mut self, scale: ScalarRamp) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the alpha ramp.
    #[must_use]
    pub fn with_alpha(mut self, alpha: ScalarRamp) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the color ramp.
    #[must_use]
    pub fn with_color(mut self, color: ColorRamp) -> Self {
        self.color = color;
        self
    }

    /// Sets the angular velocity range.
    #[must_use]
    pub fn with_rotation_speed(mut self, rotation_speed: FloatRange) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    /// Sets the initial rotation range.
    #[must_use]
    pub fn with_spin(mut self, spin: FloatRange) -> Self {
        self.spin = spin;
        self
    }

    /// Sets the texture.
    #[must_use]
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = texture;
        self
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Attaches a light to every particle.
    #[must_use]
    pub fn with_light(mut self, light: LightConfig) -> Self {
        self.light = Some(light);
        self
    }

    /// Validates and returns the config.
    ///
    /// # Errors
    ///
    /// See [`Validate::validate`].
    pub fn validated(self) -> EffectsResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error.
    pub fn from_toml_str(content: &str) -> EffectsResult<Self> {
        config::from_toml_str(content)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse or validation error.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> EffectsResult<Self> {
        config::from_toml_file(path)
    }
}

impl Validate for EmitterConfig {
    fn validate(&self) -> EffectsResult<()> {
        if self.max_particles == 0 {
            return Err(EffectsError::InvalidCapacity {
                what: "max_particles",
            });
        }

        let FloatRange { min, max } = self.lifetime;
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || max < min {
            return Err(EffectsError::InvalidLifetime { min, max });
        }

        if !(0.0..=1.0).contains(&self.explosiveness) {
            return Err(EffectsError::InvalidExplosiveness(self.explosiveness));
        }

        if !self.randomness.is_finite() || self.randomness < 0.0 {
            return Err(EffectsError::InvalidConfig(format!(
                "randomness {} must be finite and non-negative",
                self.randomness
            )));
        }

        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(EffectsError::InvalidConfig(format!(
                "damping {} must be finite and non-negative",
                self.damping
            )));
        }

        self.spawn_area.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::seeded_rng;

    #[test]
    fn test_default_is_valid() {
        assert!(EmitterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = EmitterConfig::default().with_max_particles(0).validate().unwrap_err();
        assert!(matches!(err, EffectsError::InvalidCapacity { .. }));
    }

    #[test]
    fn test_rejects_bad_lifetimes() {
        for lifetime in [
            FloatRange::new(0.0, 1.0),
            FloatRange::new(-1.0, 1.0),
            FloatRange::new(2.0, 1.0),
            FloatRange::new(1.0, f32::INFINITY),
            FloatRange::new(f32::NAN, 1.0),
        ] {
            let err = EmitterConfig::default().with_lifetime(lifetime).validate().unwrap_err();
            assert!(matches!(err, EffectsError::InvalidLifetime { .. }), "{lifetime:?}");
        }
    }

    #[test]
    fn test_rejects_bad_explosiveness() {
        for explosiveness in [-0.1, 1.5, f32::NAN] {
            let err = EmitterConfig::default()
                .with_explosiveness(explosiveness)
                .validate()
                .unwrap_err();
            assert!(matches!(err, EffectsError::InvalidExplosiveness(_)));
        }
    }

    #[test]
    fn test_rejects_negative_spawn_area() {
        let err = EmitterConfig::default()
            .with_spawn_area(SpawnArea::Circle { radius: -1.0 })
            .validate()
            .unwrap_err();
        assert!(matches!(err, EffectsError::InvalidConfig(_)));
    }

    #[test]
    fn test_rect_samples_inside() {
        let mut rng = seeded_rng(3);
        let area = SpawnArea::Rect {
            width: 20.0,
            height: 10.0,
        };
        for _ in 0..500 {
            let p = area.sample(&mut rng);
            assert!((0.0..=20.0).contains(&p.x));
            assert!((0.0..=10.0).contains(&p.y));
        }
    }

    #[test]
    fn test_circle_samples_inside() {
        let mut rng = seeded_rng(4);
        let area = SpawnArea::Circle { radius: 5.0 };
        for _ in 0..500 {
            assert!(area.sample(&mut rng).length() <= 5.0 + 1e-4);
        }
        assert_eq!(SpawnArea::Point.sample(&mut rng), Vec2::ZERO);
    }

    #[test]
    fn test_from_toml() {
        let config = EmitterConfig::from_toml_str(
            r#"
            max_particles = 40
            lifetime = [15.0, 25.0]
            blend_mode = "add"
            spawn_area = { type = "rect", width = 1920.0, height = 1080.0 }
            initial_velocity = { speed = [2.0, 8.0] }
            scale = { "0.0" = 0.1, "0.5" = 0.3, "1.0" = 0.1 }
            alpha = [0.0, 1.0]
            color = [0xff0000, 0x0000ff]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_particles, 40);
        assert_eq!(config.lifetime, FloatRange::new(15.0, 25.0));
        assert_eq!(config.blend_mode, BlendMode::Add);
        assert_eq!(config.initial_velocity.speed, FloatRange::new(2.0, 8.0));
        assert_eq!(config.initial_velocity.angle, FloatRange::new(0.0, TAU));
        assert_eq!(config.scale.keys().len(), 3);
        assert_eq!(config.color.sample(0.5).packed(), 0x80_0080);
        assert!(config.light.is_none());
    }

    #[test]
    fn test_from_toml_rejects_invalid() {
        let err = EmitterConfig::from_toml_str("explosiveness = 2.0").unwrap_err();
        assert!(matches!(err, EffectsError::InvalidExplosiveness(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EmitterConfig::default()
            .with_damping(0.1)
            .with_light(LightConfig::default());
        let text = config::to_toml_string(&config).unwrap();
        assert_eq!(EmitterConfig::from_toml_str(&text).unwrap(), config);
    }
}
