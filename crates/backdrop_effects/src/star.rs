//! # Star Emitter
//!
//! A fixed pool of decorative points animated by phase-offset sine waves.
//! Unlike [`ParticleEmitter`](crate::ParticleEmitter), stars never expire:
//! `start` places `star_count` of them once and every frame re-evaluates
//! their alpha, scale, tint and drift from a per-star clock.
//!
//! ## Per-star waves
//!
//! ```text
//! a = sin(time * alpha_speed + alpha_phase) * 0.5 + 0.5      alpha = lerp(alpha range, a)
//! s = a  (Twinkle: own sine on scale_speed/scale_phase)       scale = base * lerp(scale range, s)
//! c = (sin(time * color_speed + color_phase) + 1) * 0.5      tint  = walk(palette, c)
//! ```
//!
//! The animation preset is layered on top of the waves.

use std::f32::consts::TAU;
use std::path::Path;

use backdrop_core::{entropy_rng, seeded_rng, BlendMode, Container, FloatRange, NodeId, Rgb, SpriteNode, TextureHandle, Vec2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{self, Validate};
use crate::emitter::SpawnArea;
use crate::error::{EffectsError, EffectsResult};
use crate::tick::Tickable;

/// Star clocks wrap after an hour to keep `sin` arguments small.
pub const TIME_WRAP: f32 = 3600.0;

/// Chance per star per frame that a twinkling star retargets its speeds.
pub const TWINKLE_RETARGET_CHANCE: f32 = 0.002;

/// How far a retarget moves toward the new speed.
pub const TWINKLE_RETARGET_RATE: f32 = 0.1;

/// Animation preset layered over the per-star waves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StarAnimation {
    /// Independent scale wave, with occasional smooth speed changes.
    #[default]
    Twinkle,
    /// Shared rhythmic breathing of every star's scale.
    Pulse,
    /// Slow alpha shimmer driven by the color phase.
    Shimmer,
    /// Motion only, from the drift settings.
    Drift,
    /// Waves only.
    Static,
}

/// How per-star phase offsets are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseMode {
    /// Uniform in [0, 2π).
    #[default]
    Random,
    /// Every star at phase 0.
    Synchronized,
    /// Reserved for a positional wave; draws like `Random`.
    Wave,
}

impl PhaseMode {
    /// Draws a phase offset.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f32 {
        match self {
            Self::Synchronized => 0.0,
            Self::Random | Self::Wave => FloatRange::new(0.0, TAU).sample(rng),
        }
    }
}

/// One sinusoidal channel (alpha or scale).
///
/// Fields left out of a TOML table take these defaults: disabled, speed
/// `[0.5, 2.0]`, range `[0.3, 1.0]`, random phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveAnimation {
    /// Whether the channel animates.
    pub enabled: bool,
    /// Angular speed in radians per second, drawn per star.
    pub speed: FloatRange,
    /// Output range mapped from the wave's [0, 1].
    pub range: FloatRange,
    /// Phase offset mode.
    pub phase: PhaseMode,
}

impl WaveAnimation {
    /// An enabled channel.
    #[must_use]
    pub const fn enabled(speed: FloatRange, range: FloatRange) -> Self {
        Self {
            enabled: true,
            speed,
            range,
            phase: PhaseMode::Random,
        }
    }

    /// A disabled channel keeping `speed` and `range` for later use.
    #[must_use]
    pub const fn disabled(speed: FloatRange, range: FloatRange) -> Self {
        Self {
            enabled: false,
            speed,
            range,
            phase: PhaseMode::Random,
        }
    }
}

impl Default for WaveAnimation {
    fn default() -> Self {
        Self::disabled(FloatRange::new(0.5, 2.0), FloatRange::new(0.3, 1.0))
    }
}

/// Tint cycling across a palette.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAnimation {
    /// Whether tint animates.
    pub enabled: bool,
    /// Angular speed in radians per second, drawn per star.
    pub speed: FloatRange,
    /// Palette walked from first to last and back.
    pub colors: Vec<Rgb>,
    /// Phase offset mode.
    pub phase: PhaseMode,
}

impl Default for ColorAnimation {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: FloatRange::new(0.2, 0.8),
            colors: vec![Rgb::new(0xFF_FFFF), Rgb::new(0xFF_FFCC), Rgb::new(0xCC_CCFF)],
            phase: PhaseMode::Random,
        }
    }
}

impl ColorAnimation {
    /// Samples the palette at `t` in [0, 1].
    #[must_use]
    pub fn sample(&self, t: f32) -> Rgb {
        let Some(last) = self.colors.len().checked_sub(1) else {
            return Rgb::WHITE;
        };
        // Palettes are tiny; index math stays exact.
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (lower, local_t) = {
            let index = t.clamp(0.0, 1.0) * last as f32;
            let lower = index.floor() as usize;
            (lower.min(last), index - index.floor())
        };
        let upper = (lower + 1).min(last);
        self.colors[lower].lerp(self.colors[upper], local_t)
    }
}

/// Edge behavior for drifting stars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftBounds {
    /// Leaving one edge re-enters at the opposite edge.
    #[default]
    Wrap,
    /// Velocity flips and the star is clamped to the edge.
    Bounce,
    /// Stars drift away freely.
    None,
}

/// Linear star motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Whether stars move.
    pub enabled: bool,
    /// Horizontal speed, drawn per star.
    pub speed_x: FloatRange,
    /// Vertical speed, drawn per star.
    pub speed_y: FloatRange,
    /// Edge behavior over the spawn area's bounding box.
    pub bounds: DriftBounds,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            speed_x: FloatRange::new(-5.0, 5.0),
            speed_y: FloatRange::new(-5.0, 5.0),
            bounds: DriftBounds::Wrap,
        }
    }
}

/// Full description of a star field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    /// Number of stars.
    pub star_count: u32,
    /// Where stars are placed.
    pub spawn_area: SpawnArea,
    /// Star texture.
    pub texture: TextureHandle,
    /// Preset layered over the waves.
    pub animation: StarAnimation,
    /// Base scale, drawn per star.
    pub scale_range: FloatRange,
    /// Initial tint.
    pub base_color: Rgb,
    /// Compositing mode.
    pub blend_mode: BlendMode,
    /// Alpha wave.
    pub alpha_animation: WaveAnimation,
    /// Scale wave.
    pub scale_animation: WaveAnimation,
    /// Tint cycling.
    pub color_animation: ColorAnimation,
    /// Motion.
    pub drift: DriftConfig,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            star_count: 50,
            spawn_area: SpawnArea::Rect {
                width: 800.0,
                height: 600.0,
            },
            texture: TextureHandle::WHITE,
            animation: StarAnimation::Twinkle,
            scale_range: FloatRange::new(0.3, 1.2),
            base_color: Rgb::WHITE,
            blend_mode: BlendMode::Normal,
            alpha_animation: WaveAnimation::enabled(FloatRange::new(0.5, 2.0), FloatRange::new(0.3, 1.0)),
            scale_animation: WaveAnimation::disabled(FloatRange::new(0.3, 1.5), FloatRange::new(0.8, 1.2)),
            color_animation: ColorAnimation::default(),
            drift: DriftConfig::default(),
        }
    }
}

impl StarConfig {
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

impl Validate for StarConfig {
    fn validate(&self) -> EffectsResult<()> {
        if self.star_count == 0 {
            return Err(EffectsError::InvalidCapacity { what: "star_count" });
        }
        if self.color_animation.colors.is_empty() {
            return Err(EffectsError::InvalidConfig(
                "color_animation.colors needs at least one color".to_string(),
            ));
        }
        let (min, max) = self.spawn_area.bounds();
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite())
            || max.x < min.x
            || max.y < min.y
        {
            return Err(EffectsError::InvalidConfig(format!(
                "spawn area {:?} needs finite, non-negative dimensions",
                self.spawn_area
            )));
        }
        Ok(())
    }
}

/// One star's animation state.
#[derive(Clone, Debug, PartialEq)]
struct Star {
    node: NodeId,
    position: Vec2,
    base_scale: f32,
    alpha_phase: f32,
    scale_phase: f32,
    color_phase: f32,
    alpha_speed: f32,
    scale_speed: f32,
    color_speed: f32,
    drift: Vec2,
    time: f32,
}

/// An animated star field.
///
/// # Example
///
/// ```rust
/// use backdrop_effects::{StarConfig, StarEmitter};
///
/// let mut stars = StarEmitter::with_seed(StarConfig::default(), 3).unwrap();
/// stars.start();
/// stars.update(1.0 / 60.0);
/// assert_eq!(stars.container().len(), 50);
/// ```
#[derive(Debug)]
pub struct StarEmitter {
    config: StarConfig,
    stars: Vec<Star>,
    container: Container,
    rng: ChaCha8Rng,
    running: bool,
}

impl StarEmitter {
    /// Creates a stopped star field with an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error.
    pub fn new(config: StarConfig) -> EffectsResult<Self> {
        Self::with_rng(config, entropy_rng())
    }

    /// Creates a stopped star field with a deterministic RNG.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error.
    pub fn with_seed(config: StarConfig, seed: u64) -> EffectsResult<Self> {
        Self::with_rng(config, seeded_rng(seed))
    }

    fn with_rng(config: StarConfig, rng: ChaCha8Rng) -> EffectsResult<Self> {
        config.validate()?;
        let capacity = config.star_count as usize;
        Ok(Self {
            config,
            stars: Vec::with_capacity(capacity),
            container: Container::with_capacity(capacity),
            rng,
            running: false,
        })
    }

    /// Places every star and starts animating. No-op when running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.spawn_all();
        tracing::debug!(stars = self.stars.len(), "star field started");
    }

    /// Stops animating. Stars stay in place.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        tracing::debug!("star field stopped");
    }

    /// Removes every star.
    pub fn clear(&mut self) {
        self.stars.clear();
        self.container.clear();
    }

    /// Replaces the config, clears, and respawns if running.
    ///
    /// On error the field is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the new config's validation error.
    pub fn set_config(&mut self, config: StarConfig) -> EffectsResult<()> {
        config.validate()?;
        self.config = config;
        self.clear();
        if self.running {
            self.spawn_all();
        }
        tracing::debug!(star_count = self.config.star_count, "star field reconfigured");
        Ok(())
    }

    /// Applies overrides to a copy of the current config, then
    /// [`set_config`](Self::set_config)s it.
    ///
    /// # Errors
    ///
    /// Returns the modified config's validation error.
    pub fn reconfigure<F>(&mut self, apply: F) -> EffectsResult<()>
    where
        F: FnOnce(&mut StarConfig),
    {
        let mut config = self.config.clone();
        apply(&mut config);
        self.set_config(config)
    }

    fn spawn_all(&mut self) {
        for _ in 0..self.config.star_count {
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        let config = &self.config;
        let rng = &mut self.rng;

        let position = config.spawn_area.sample(rng);
        let base_scale = config.scale_range.sample(rng);

        let mut sprite = SpriteNode::new(config.texture)
            .at(position)
            .with_blend_mode(config.blend_mode);
        sprite.tint = config.base_color;
        sprite.set_uniform_scale(base_scale);
        let node = self.container.add_child(sprite);

        let drift = if config.drift.enabled {
            Vec2::new(config.drift.speed_x.sample(rng), config.drift.speed_y.sample(rng))
        } else {
            Vec2::ZERO
        };

        self.stars.push(Star {
            node,
            position,
            base_scale,
            alpha_phase: config.alpha_animation.phase.sample(rng),
            scale_phase: config.scale_animation.phase.sample(rng),
            color_phase: config.color_animation.phase.sample(rng),
            alpha_speed: config.alpha_animation.speed.sample(rng),
            scale_speed: config.scale_animation.speed.sample(rng),
            color_speed: config.color_animation.speed.sample(rng),
            drift,
            time: 0.0,
        });
    }

    /// Advances every star by `dt` seconds. No-op when stopped.
    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        let dt = if dt.is_finite() && dt > 0.0 {
            dt
        } else {
            if dt != 0.0 {
                tracing::warn!(dt, "ignoring invalid frame delta");
            }
            0.0
        };

        let config = &self.config;
        let (min, max) = config.spawn_area.bounds();

        for star in &mut self.stars {
            star.time += dt;
            if star.time > TIME_WRAP {
                star.time %= TIME_WRAP;
            }

            let Some(sprite) = self.container.child_mut(star.node) else {
                continue;
            };

            let mut alpha_t = 0.5;
            if config.alpha_animation.enabled {
                alpha_t = wave(star.time, star.alpha_speed, star.alpha_phase);
                sprite.alpha = config.alpha_animation.range.lerp(alpha_t);
            }

            if config.scale_animation.enabled {
                let scale_t = if config.animation == StarAnimation::Twinkle {
                    wave(star.time, star.scale_speed, star.scale_phase)
                } else {
                    alpha_t
                };
                sprite.set_uniform_scale(star.base_scale * config.scale_animation.range.lerp(scale_t));
            }

            if config.color_animation.enabled {
                let color_t = ((star.time * star.color_speed + star.color_phase).sin() + 1.0) * 0.5;
                sprite.tint = config.color_animation.sample(color_t);
            }

            if config.drift.enabled {
                star.position += star.drift * dt;
                apply_bounds(&mut star.position, &mut star.drift, config.drift.bounds, min, max);
                sprite.position = star.position;
            }

            match config.animation {
                StarAnimation::Twinkle => {
                    if self.rng.gen::<f32>() < TWINKLE_RETARGET_CHANCE {
                        let target = config.alpha_animation.speed.sample(&mut self.rng);
                        star.alpha_speed += (target - star.alpha_speed) * TWINKLE_RETARGET_RATE;
                        let target = config.scale_animation.speed.sample(&mut self.rng);
                        star.scale_speed += (target - star.scale_speed) * TWINKLE_RETARGET_RATE;
                    }
                }
                StarAnimation::Pulse => {
                    let pulse_t = (star.time * 1.5).sin() * 0.5 + 0.5;
                    sprite.set_uniform_scale(star.base_scale * (0.8 + 0.4 * pulse_t));
                }
                StarAnimation::Shimmer => {
                    let hue = (star.time * 0.5 + star.color_phase) % TAU;
                    sprite.alpha = hue.sin() * 0.3 + 0.7;
                }
                StarAnimation::Drift | StarAnimation::Static => {}
            }
        }
    }

    /// The drawable output.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// Mutable access to the container's own transform and opacity.
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// True between `start` and `stop`.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Number of stars.
    #[must_use]
    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    /// The active config.
    #[must_use]
    pub const fn config(&self) -> &StarConfig {
        &self.config
    }
}

impl Tickable for StarEmitter {
    fn on_tick(&mut self, dt: f32) {
        self.update(dt);
    }
}

#[inline]
fn wave(time: f32, speed: f32, phase: f32) -> f32 {
    (time * speed + phase).sin() * 0.5 + 0.5
}

fn apply_bounds(position: &mut Vec2, velocity: &mut Vec2, bounds: DriftBounds, min: Vec2, max: Vec2) {
    match bounds {
        DriftBounds::Wrap => {
            if position.x < min.x {
                position.x = max.x;
            } else if position.x > max.x {
                position.x = min.x;
            }
            if position.y < min.y {
                position.y = max.y;
            } else if position.y > max.y {
                position.y = min.y;
            }
        }
        DriftBounds::Bounce => {
            if position.x < min.x || position.x > max.x {
                velocity.x = -velocity.x;
                position.x = position.x.clamp(min.x, max.x);
            }
            if position.y < min.y || position.y > max.y {
                velocity.y = -velocity.y;
                position.y = position.y.clamp(min.y, max.y);
            }
        }
        DriftBounds::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(count: u32) -> StarConfig {
        StarConfig {
            star_count: count,
            spawn_area: SpawnArea::Rect {
                width: 100.0,
                height: 50.0,
            },
            ..StarConfig::default()
        }
    }

    #[test]
    fn test_start_spawns_all_stars_once() {
        let mut stars = StarEmitter::with_seed(field(25), 1).unwrap();
        assert_eq!(stars.star_count(), 0);
        stars.start();
        stars.start();
        assert_eq!(stars.star_count(), 25);
        assert_eq!(stars.container().len(), 25);
    }

    #[test]
    fn test_stars_inside_spawn_area() {
        let mut stars = StarEmitter::with_seed(field(200), 2).unwrap();
        stars.start();
        for (_, node) in stars.container().children() {
            assert!((0.0..=100.0).contains(&node.position.x));
            assert!((0.0..=50.0).contains(&node.position.y));
        }
    }

    #[test]
    fn test_alpha_stays_in_range() {
        let mut stars = StarEmitter::with_seed(field(40), 3).unwrap();
        stars.start();
        for _ in 0..300 {
            stars.update(1.0 / 30.0);
            for (_, node) in stars.container().children() {
                assert!((0.3 - 1e-5..=1.0 + 1e-5).contains(&node.alpha), "alpha {}", node.alpha);
            }
        }
    }

    #[test]
    fn test_disabled_alpha_keeps_full_opacity() {
        let mut config = field(10);
        config.alpha_animation.enabled = false;
        config.animation = StarAnimation::Static;
        let mut stars = StarEmitter::with_seed(config, 4).unwrap();
        stars.start();
        stars.update(0.5);
        assert!(stars.container().children().all(|(_, n)| n.alpha == 1.0));
    }

    #[test]
    fn test_scale_follows_alpha_wave_unless_twinkling() {
        let mut config = field(5);
        config.animation = StarAnimation::Static;
        config.scale_range = FloatRange::constant(1.0);
        config.alpha_animation.range = FloatRange::new(0.0, 1.0);
        config.scale_animation = WaveAnimation::enabled(FloatRange::new(1.0, 2.0), FloatRange::new(0.0, 1.0));
        let mut stars = StarEmitter::with_seed(config, 5).unwrap();
        stars.start();
        stars.update(0.7);

        for (_, node) in stars.container().children() {
            assert!((node.scale.x - node.alpha).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pulse_scale() {
        let mut config = field(3);
        config.animation = StarAnimation::Pulse;
        config.scale_range = FloatRange::constant(2.0);
        let mut stars = StarEmitter::with_seed(config, 6).unwrap();
        stars.start();
        stars.update(1.0);

        let pulse_t = 1.5_f32.sin() * 0.5 + 0.5;
        let expected = 2.0 * (0.8 + 0.4 * pulse_t);
        for (_, node) in stars.container().children() {
            assert!((node.scale.x - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_shimmer_alpha_range() {
        let mut config = field(20);
        config.animation = StarAnimation::Shimmer;
        let mut stars = StarEmitter::with_seed(config, 7).unwrap();
        stars.start();
        for _ in 0..100 {
            stars.update(0.1);
            for (_, node) in stars.container().children() {
                assert!((0.4 - 1e-5..=1.0 + 1e-5).contains(&node.alpha));
            }
        }
    }

    #[test]
    fn test_synchronized_phase() {
        let mut config = field(10);
        config.animation = StarAnimation::Static;
        config.alpha_animation = WaveAnimation {
            phase: PhaseMode::Synchronized,
            ..WaveAnimation::enabled(FloatRange::constant(1.0), FloatRange::new(0.0, 1.0))
        };
        let mut stars = StarEmitter::with_seed(config, 8).unwrap();
        stars.start();
        stars.update(0.25);

        let expected = 0.25_f32.sin() * 0.5 + 0.5;
        assert!(stars
            .container()
            .children()
            .all(|(_, n)| (n.alpha - expected).abs() < 1e-5));
    }

    #[test]
    fn test_palette_walk() {
        let palette = ColorAnimation {
            colors: vec![Rgb::new(0xFF_0000), Rgb::new(0x00_FF00), Rgb::new(0x00_00FF)],
            ..ColorAnimation::default()
        };
        assert_eq!(palette.sample(0.0).packed(), 0xFF_0000);
        assert_eq!(palette.sample(0.5).packed(), 0x00_FF00);
        assert_eq!(palette.sample(1.0).packed(), 0x00_00FF);
        assert_eq!(palette.sample(0.25).packed(), 0x80_8000);
    }

    #[test]
    fn test_time_wraps_after_an_hour() {
        let mut stars = StarEmitter::with_seed(field(1), 9).unwrap();
        stars.start();
        stars.update(3000.0);
        stars.update(700.0);
        assert!((stars.stars[0].time - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_invalid_delta_holds_time() {
        let mut stars = StarEmitter::with_seed(field(4), 12).unwrap();
        stars.start();
        stars.update(0.5);
        let before: Vec<f32> = stars.stars.iter().map(|s| s.time).collect();

        stars.update(-1.0);
        stars.update(f32::NAN);
        stars.update(f32::INFINITY);

        let after: Vec<f32> = stars.stars.iter().map(|s| s.time).collect();
        assert_eq!(before, after);
        assert!(stars.container().children().all(|(_, n)| n.alpha.is_finite()));
    }

    #[test]
    fn test_wrap_bounds() {
        let (min, max) = (Vec2::ZERO, Vec2::new(10.0, 10.0));
        let mut position = Vec2::new(-0.5, 10.5);
        let mut velocity = Vec2::new(-1.0, 1.0);
        apply_bounds(&mut position, &mut velocity, DriftBounds::Wrap, min, max);
        assert_eq!(position, Vec2::new(10.0, 0.0));
        assert_eq!(velocity, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_bounce_bounds() {
        let (min, max) = (Vec2::splat(-5.0), Vec2::splat(5.0));
        let mut position = Vec2::new(6.0, 0.0);
        let mut velocity = Vec2::new(2.0, 1.0);
        apply_bounds(&mut position, &mut velocity, DriftBounds::Bounce, min, max);
        assert_eq!(position, Vec2::new(5.0, 0.0));
        assert_eq!(velocity, Vec2::new(-2.0, 1.0));
    }

    #[test]
    fn test_drift_moves_stars() {
        let mut config = field(4);
        config.animation = StarAnimation::Drift;
        config.drift = DriftConfig {
            enabled: true,
            speed_x: FloatRange::constant(1.0),
            speed_y: FloatRange::constant(0.0),
            bounds: DriftBounds::None,
        };
        let mut stars = StarEmitter::with_seed(config, 10).unwrap();
        stars.start();
        let before: Vec<Vec2> = stars.container().children().map(|(_, n)| n.position).collect();
        stars.update(2.0);
        let after: Vec<Vec2> = stars.container().children().map(|(_, n)| n.position).collect();
        for (b, a) in before.iter().zip(&after) {
            assert!((a.x - b.x - 2.0).abs() < 1e-4);
            assert_eq!(a.y, b.y);
        }
    }

    #[test]
    fn test_set_config_respawns_when_running() {
        let mut stars = StarEmitter::with_seed(field(10), 11).unwrap();
        stars.set_config(field(4)).unwrap();
        assert_eq!(stars.star_count(), 0);

        stars.start();
        stars.reconfigure(|cfg| cfg.star_count = 7).unwrap();
        assert_eq!(stars.star_count(), 7);

        assert!(stars.reconfigure(|cfg| cfg.color_animation.colors.clear()).is_err());
        assert_eq!(stars.star_count(), 7);
    }

    #[test]
    fn test_stop_freezes_animation() {
        let mut stars = StarEmitter::with_seed(field(5), 12).unwrap();
        stars.start();
        stars.update(0.3);
        stars.stop();
        let before: Vec<f32> = stars.container().children().map(|(_, n)| n.alpha).collect();
        stars.update(1.0);
        let after: Vec<f32> = stars.container().children().map(|(_, n)| n.alpha).collect();
        assert_eq!(before, after);
        stars.clear();
        assert!(stars.container().is_empty());
    }

    #[test]
    fn test_from_toml() {
        let config = StarConfig::from_toml_str(
            r#"
            star_count = 25
            animation = "twinkle"
            spawn_area = { type = "rect", width = 1920.0, height = 540.0 }
            scale_range = [0.8, 2.0]
            alpha_animation = { enabled = true, speed = [1.0, 5.8], range = [0.3, 1.0] }

            [scale_animation]
            enabled = true
            speed = [1.0, 5.8]
            range = [1.35, 2.15]
            phase = "wave"
            "#,
        )
        .unwrap();
        assert_eq!(config.star_count, 25);
        assert!(config.scale_animation.enabled);
        assert_eq!(config.scale_animation.phase, PhaseMode::Wave);
        assert!(!config.drift.enabled);
        assert_eq!(config.color_animation.colors.len(), 3);
    }
}
