//! # Dust Fields
//!
//! Three stacked emitters of drifting motes: a main body, a faint wispy
//! haze and a sparse chaotic layer. [`DustOptions`] maps a handful of
//! artistic knobs onto their [`EmitterConfig`]s.
//!
//! Per-layer jitter (wind sway, ramp wobble) is drawn once while the config
//! is built, so the same seed always yields the same scene.

use std::f32::consts::{PI, TAU};

use backdrop_core::{seeded_rng, BlendMode, FloatRange, Rgb, Vec2};
use backdrop_effects::{ColorRamp, EmitterConfig, ScalarRamp, SpawnArea};
use serde::{Deserialize, Serialize};

use crate::error::SceneResult;
use crate::scene::{LayerConfig, SceneConfig};

/// Seed used by [`super::preset`].
pub const DUST_SEED: u64 = 0x0D05_7000;

/// Which way the motes drift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatDirection {
    /// Rising, like warm air.
    #[default]
    Up,
    /// Settling.
    Down,
    /// Any direction, with a light pull down.
    Random,
    /// Any direction, faster, weightless.
    Circular,
}

/// Per-direction launch settings, before per-layer adjustments.
struct Drift {
    speed: FloatRange,
    angle: FloatRange,
    lift: f32,
}

impl FloatDirection {
    fn drift(self, drift_speed: f32, gravity: f32) -> Drift {
        let speed = |lo: f32, hi: f32| FloatRange::new(lo * drift_speed, hi * drift_speed);
        match self {
            Self::Up => Drift {
                speed: speed(5.0, 15.0),
                angle: FloatRange::new(PI * 1.3, PI * 1.7),
                lift: -gravity * 10.0,
            },
            Self::Down => Drift {
                speed: speed(5.0, 15.0),
                angle: FloatRange::new(PI * 0.3, PI * 0.7),
                lift: gravity * 10.0,
            },
            Self::Random => Drift {
                speed: speed(3.0, 12.0),
                angle: FloatRange::new(0.0, TAU),
                lift: gravity * 5.0,
            },
            Self::Circular => Drift {
                speed: speed(8.0, 18.0),
                angle: FloatRange::new(0.0, TAU),
                lift: 0.0,
            },
        }
    }
}

/// How long each mote lives, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifetimeClass {
    /// 3 to 8 seconds.
    Short,
    /// 8 to 15 seconds.
    Medium,
    /// 15 to 30 seconds.
    #[default]
    Long,
    /// 30 to 60 seconds.
    Eternal,
}

impl LifetimeClass {
    /// The lifetime range for this class.
    #[must_use]
    pub fn range(self) -> FloatRange {
        match self {
            Self::Short => FloatRange::new(3.0, 8.0),
            Self::Medium => FloatRange::new(8.0, 15.0),
            Self::Long => FloatRange::new(15.0, 30.0),
            Self::Eternal => FloatRange::new(30.0, 60.0),
        }
    }
}

/// Mote tints, darkening over four stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DustPalette {
    /// White fading to mid gray.
    #[default]
    White,
    /// Earthy browns.
    DustyBrown,
    /// Ash grays.
    AshGray,
    /// Olive greens.
    SporeGreen,
    /// Slate blues into deep purple.
    DecayPurple,
}

impl DustPalette {
    /// Colors at lifetime 0, 0.3, 0.6 and 1.
    #[must_use]
    pub const fn stops(self) -> [Rgb; 4] {
        let packed = match self {
            Self::White => [0xFF_FFFF, 0xF0_F0F0, 0xD0_D0D0, 0xB0_B0B0],
            Self::DustyBrown => [0x8B_7355, 0x9C_8A6B, 0x7A_6A5A, 0x6B_5B4A],
            Self::AshGray => [0x69_6969, 0x80_8080, 0x55_5555, 0x2F_2F2F],
            Self::SporeGreen => [0x55_6B2F, 0x6B_8E23, 0x4F_5F2F, 0x2E_3A1F],
            Self::DecayPurple => [0x6A_5ACD, 0x48_3D8B, 0x4B_0082, 0x30_1934],
        };
        [
            Rgb::new(packed[0]),
            Rgb::new(packed[1]),
            Rgb::new(packed[2]),
            Rgb::new(packed[3]),
        ]
    }
}

/// Where motes appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DustSpawn {
    /// The whole viewport.
    #[default]
    FullScreen,
    /// The viewport plus a margin, so motes drift in from offscreen.
    Edges,
    /// A disc of 30% of the shorter side.
    Center,
    /// A strip along the bottom fifth.
    BottomUp,
}

impl DustSpawn {
    fn area(self, width: f32, height: f32) -> SpawnArea {
        match self {
            Self::FullScreen => SpawnArea::Rect { width, height },
            Self::Edges => SpawnArea::Rect {
                width: width * 1.2,
                height: height * 1.2,
            },
            Self::Center => SpawnArea::Circle {
                radius: width.min(height) * 0.3,
            },
            Self::BottomUp => SpawnArea::Rect {
                width,
                height: height * 0.2,
            },
        }
    }
}

/// Knobs for [`dusty_background`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DustOptions {
    /// Peak alpha multiplier.
    pub opacity: f32,
    /// Main layer capacity; the other layers scale from it.
    pub density: u32,
    /// Launch speed multiplier.
    pub drift_speed: f32,
    /// Base mote size.
    pub particle_size: f32,
    /// Drift direction.
    pub float_direction: FloatDirection,
    /// Horizontal sway strength.
    pub wind_strength: f32,
    /// How much the sway varies between layers.
    pub turbulence: f32,
    /// Lifetime class.
    pub particle_lifetime: LifetimeClass,
    /// Tint palette.
    pub color_palette: DustPalette,
    /// Compositing mode for every layer.
    pub blend_mode: BlendMode,
    /// Spawn region.
    pub spawn_area: DustSpawn,
    /// Fraction of the main layer spawned at once on start.
    pub spawn_burst: f32,
    /// Extra velocity damping.
    pub drift_chaos: f32,
    /// Vertical pull.
    pub gravity_strength: f32,
    /// Spin multiplier.
    pub rotation_speed: f32,
}

impl Default for DustOptions {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            density: 50,
            drift_speed: 0.5,
            particle_size: 1.0,
            float_direction: FloatDirection::Up,
            wind_strength: 0.3,
            turbulence: 0.4,
            particle_lifetime: LifetimeClass::Long,
            color_palette: DustPalette::White,
            blend_mode: BlendMode::Normal,
            spawn_area: DustSpawn::FullScreen,
            spawn_burst: 0.1,
            drift_chaos: 0.3,
            gravity_strength: 0.1,
            rotation_speed: 0.5,
        }
    }
}

/// Drifting dust over the whole viewport, in three layers.
///
/// # Errors
///
/// Never fails; ramp construction is checked anyway. Nonsensical options
/// surface when the scene is validated.
pub fn dusty_background(width: f32, height: f32, options: &DustOptions, seed: u64) -> SceneResult<SceneConfig> {
    let mut rng = seeded_rng(seed);
    let mut unit = move || FloatRange::new(0.0, 1.0).sample(&mut rng);

    let drift = options.float_direction.drift(options.drift_speed, options.gravity_strength);
    let life = options.particle_lifetime.range();
    let area = options.spawn_area.area(width, height);
    let [c0, c1, c2, c3] = options.color_palette.stops();
    let op = options.opacity;
    let size = options.particle_size * 0.5;
    let wind = options.wind_strength * options.turbulence;
    let spin = |factor: f32| {
        let rate = options.rotation_speed * factor;
        FloatRange::new(-rate, rate)
    };
    let density = options.density.max(1);

    let main = EmitterConfig::default()
        .with_max_particles(density)
        .with_lifetime(life)
        .with_explosiveness(options.spawn_burst)
        .with_spawn_area(area)
        .with_velocity(drift.speed, drift.angle)
        .with_acceleration(Vec2::new(
            (unit() - 0.5) * wind * 20.0,
            drift.lift + (unit() - 0.5) * options.turbulence * 15.0,
        ))
        .with_damping(0.005 + options.drift_chaos * 0.02)
        .with_scale(ScalarRamp::new([
            (0.0, size * (0.8 + 0.4 * unit())),
            (0.5, size * (1.0 + 0.3 * unit())),
            (1.0, size * (0.3 + 0.2 * unit())),
        ])?)
        .with_color(ColorRamp::new([(0.0, c0), (0.3, c1), (0.6, c2), (1.0, c3)])?)
        .with_alpha(ScalarRamp::new([
            (0.0, 0.0),
            (0.1, op * (0.2 + 0.3 * unit())),
            (0.5, op * (0.4 + 0.4 * unit())),
            (0.9, op * (0.3 + 0.2 * unit())),
            (1.0, 0.0),
        ])?)
        .with_rotation_speed(spin(0.04))
        .with_blend_mode(options.blend_mode);

    let wispy = EmitterConfig::default()
        .with_max_particles(scaled(density, 7))
        .with_lifetime(FloatRange::new(life.min * 1.5, life.max * 1.5))
        .with_explosiveness(options.spawn_burst * 0.5)
        .with_spawn_area(area)
        .with_velocity(
            FloatRange::new(drift.speed.min * 0.5, drift.speed.max * 0.5),
            FloatRange::new(drift.angle.min - PI * 0.3, drift.angle.max + PI * 0.3),
        )
        .with_acceleration(Vec2::new((unit() - 0.5) * wind * 8.0, drift.lift * 0.3))
        .with_damping(0.002 + options.drift_chaos * 0.01)
        .with_scale(ScalarRamp::new([(0.0, size * 0.3), (0.7, size * 0.6), (1.0, size * 0.1)])?)
        .with_color(ColorRamp::new([(0.0, c1), (0.5, c2), (1.0, c3)])?)
        .with_alpha(ScalarRamp::new([(0.0, 0.0), (0.2, op * 0.2), (0.8, op * 0.3), (1.0, 0.0)])?)
        .with_rotation_speed(spin(0.02))
        .with_blend_mode(options.blend_mode);

    let chaotic = EmitterConfig::default()
        .with_max_particles(scaled(density, 4))
        .with_lifetime(FloatRange::new(life.min * 0.8, life.max * 1.2))
        .with_explosiveness(options.spawn_burst * 0.3)
        .with_spawn_area(area)
        .with_velocity(
            FloatRange::new(drift.speed.min * 1.5, drift.speed.max * 1.5),
            FloatRange::new(0.0, TAU),
        )
        .with_acceleration(Vec2::new((unit() - 0.5) * wind * 40.0, (unit() - 0.5) * wind * 30.0))
        .with_damping(0.01 + options.drift_chaos * 0.03)
        .with_scale(ScalarRamp::new([(0.0, size * 1.5), (0.3, size * 1.8), (1.0, size * 0.4)])?)
        .with_color(ColorRamp::new([(0.0, c0), (0.4, c1), (1.0, c3)])?)
        .with_alpha(ScalarRamp::new([(0.0, 0.0), (0.1, op * 0.6), (0.6, op * 0.4), (1.0, 0.0)])?)
        .with_rotation_speed(spin(0.06))
        .with_blend_mode(options.blend_mode);

    Ok(SceneConfig::new("dusty_background")
        .with_layer(LayerConfig::particles("dust", main).with_texture("dust"))
        .with_layer(LayerConfig::particles("wisps", wispy).with_texture("dust"))
        .with_layer(LayerConfig::particles("chaos", chaotic).with_texture("dust")))
}

/// `floor(density * tenths / 10)`, at least one.
fn scaled(density: u32, tenths: u32) -> u32 {
    (density.saturating_mul(tenths) / 10).max(1)
}
