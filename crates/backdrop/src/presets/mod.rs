//! # Built-in Scenes
//!
//! Ready-made scene configs sized to a viewport. Layers reference textures
//! by name; register every entry of [`TEXTURE_NAMES`] before building.

use std::f32::consts::{PI, TAU};

use backdrop_core::{BlendMode, FloatRange, Rgb, Vec2};
use backdrop_effects::{
    ColorRamp, EmitterConfig, LightConfig, ScalarRamp, SpawnArea, StarAnimation, StarConfig,
    VisibilityWindow, WaveAnimation,
};

use crate::error::{SceneError, SceneResult};
use crate::scene::{LayerConfig, SceneConfig};

mod dust;

pub use dust::{dusty_background, DustOptions, DustPalette, DustSpawn, FloatDirection, LifetimeClass, DUST_SEED};

/// Names accepted by [`preset`].
pub const PRESET_NAMES: [&str; 5] = [
    "ambient_orbs",
    "firefly_forest",
    "scenic_city",
    "dusty_background",
    "celestia_valley",
];

/// Texture names referenced by the built-in scenes.
pub const TEXTURE_NAMES: [&str; 7] = ["orb", "pixel_star", "firefly", "firefly_glow", "leaf", "star", "dust"];

const FIREFLY_YELLOW: Rgb = Rgb::new(0xFF_FF00);
const LEAF_SHADOW: Rgb = Rgb::new(0x0D_1620);

/// Looks up a built-in scene by name.
///
/// # Errors
///
/// Returns [`SceneError::UnknownPreset`] for names outside [`PRESET_NAMES`].
pub fn preset(name: &str, width: f32, height: f32) -> SceneResult<SceneConfig> {
    match name {
        "ambient_orbs" => ambient_orbs(width, height),
        "firefly_forest" => firefly_forest(width, height),
        "scenic_city" => scenic_city(width, height),
        "dusty_background" => dusty_background(width, height, &DustOptions::default(), DUST_SEED),
        "celestia_valley" => celestia_valley(width, height),
        other => Err(SceneError::UnknownPreset(other.to_string())),
    }
}

/// Three parallax fields of slow, softly pulsing orbs.
///
/// # Errors
///
/// Never fails for finite sizes; ramp construction is checked anyway.
pub fn ambient_orbs(width: f32, height: f32) -> SceneResult<SceneConfig> {
    let area = SpawnArea::Rect { width, height };
    let field = |max: u32, life: (f32, f32), speed: (f32, f32)| {
        EmitterConfig::default()
            .with_max_particles(max)
            .with_lifetime(FloatRange::new(life.0, life.1))
            .with_spawn_area(area)
            .with_velocity(FloatRange::new(speed.0, speed.1), FloatRange::new(0.0, TAU))
    };

    let back = field(40, (15.0, 25.0), (2.0, 8.0))
        .with_scale(ScalarRamp::new([(0.0, 0.1), (0.5, 0.3), (1.0, 0.1)])?)
        .with_alpha(ScalarRamp::new([(0.0, 0.0), (0.2, 0.1), (0.5, 0.3), (0.8, 0.1), (1.0, 0.0)])?);

    let mid = field(60, (10.0, 20.0), (5.0, 20.0))
        .with_scale(ScalarRamp::new([(0.0, 0.2), (0.5, 0.5), (1.0, 0.2)])?)
        .with_alpha(ScalarRamp::new([(0.0, 0.0), (0.2, 0.15), (0.5, 1.0), (0.8, 0.15), (1.0, 0.0)])?);

    let front = field(25, (6.0, 12.0), (10.0, 30.0))
        .with_scale(ScalarRamp::new([(0.0, 0.6), (0.5, 1.0), (1.0, 0.6)])?)
        .with_alpha(ScalarRamp::new([(0.0, 0.0), (0.2, 0.3), (0.5, 1.0), (0.8, 0.3), (1.0, 0.0)])?)
        .with_blend_mode(BlendMode::Add);

    Ok(SceneConfig::new("ambient_orbs")
        .with_layer(LayerConfig::particles("back", back).with_texture("orb"))
        .with_layer(LayerConfig::particles("mid", mid).with_texture("orb"))
        .with_layer(LayerConfig::particles("front", front).with_texture("orb")))
}

/// Night forest: pixel stars and fireflies that only show after dusk, plus
/// leaves falling at all hours.
///
/// Drive it with a progress value such as [`crate::DayNightCycle`].
///
/// # Errors
///
/// Never fails for finite sizes; ramp construction is checked anyway.
pub fn firefly_forest(width: f32, height: f32) -> SceneResult<SceneConfig> {
    let pixel_stars = EmitterConfig::default()
        .with_max_particles(100)
        .with_lifetime(FloatRange::new(2.0, 3.0))
        .with_spawn_area(SpawnArea::Rect { width, height })
        .with_velocity(FloatRange::constant(0.0), FloatRange::constant(0.0))
        .with_scale(ScalarRamp::new([(0.3, 0.0), (0.5, 4.0), (0.7, 0.0)])?);

    // Each firefly flashes once, mid-life.
    let fireflies = EmitterConfig::default()
        .with_max_particles(150)
        .with_lifetime(FloatRange::new(7.0, 14.0))
        .with_spawn_area(SpawnArea::Rect {
            width,
            height: height * 0.3,
        })
        .with_velocity(FloatRange::constant(100.0), FloatRange::new(0.0, 5.0 * PI))
        .with_blend_mode(BlendMode::Add)
        .with_scale(ScalarRamp::new([(0.0, 0.0), (0.2, 10.0), (0.8, 10.0), (1.0, 0.0)])?)
        .with_alpha(ScalarRamp::new([(0.0, 0.0), (0.1, 1.0), (0.9, 1.0), (1.0, 0.0)])?)
        .with_color(ColorRamp::new([(0.45, Rgb::BLACK), (0.5, FIREFLY_YELLOW), (0.55, Rgb::BLACK)])?)
        .with_light(LightConfig {
            scale: ScalarRamp::new([(0.48, 0.0), (0.5, 4.0), (0.52, 0.0)])?,
            energy: ScalarRamp::new([(0.48, 0.0), (0.5, 1.0), (0.52, 0.0)])?,
            hue: ColorRamp::new([(0.48, Rgb::BLACK), (0.5, FIREFLY_YELLOW), (0.52, Rgb::BLACK)])?,
            ..LightConfig::default()
        });

    let leaves = EmitterConfig::default()
        .with_max_particles(10)
        .with_lifetime(FloatRange::constant(10.0))
        .with_spawn_area(SpawnArea::Rect { width, height: 0.0 })
        .with_velocity(FloatRange::new(200.0, 300.0), FloatRange::constant(0.75 * PI))
        .with_rotation_speed(FloatRange::new(-2.0, 2.0))
        .with_acceleration(Vec2::new(0.0, 60.0))
        .with_damping(0.1)
        .with_scale(ScalarRamp::constant(5.0))
        .with_color(ColorRamp::constant(LEAF_SHADOW));

    Ok(SceneConfig::new("firefly_forest")
        .with_layer(
            LayerConfig::particles("stars", pixel_stars)
                .with_texture("pixel_star")
                .with_visibility(VisibilityWindow::new(0.6, 1.0).with_fade_time(0.5)),
        )
        .with_layer(
            LayerConfig::particles("fireflies", fireflies)
                .with_texture("firefly")
                .with_light_texture("firefly_glow")
                .at(Vec2::new(0.0, height * 0.45))
                .with_visibility(
                    VisibilityWindow::new(0.5, 1.0)
                        .with_fade_time(0.2)
                        .with_alphas(1.0, 0.2),
                ),
        )
        .with_layer(LayerConfig::particles("leaves", leaves).with_texture("leaf")))
}

/// A twinkling sky over the upper half of a city skyline, lit after dusk and
/// left faintly visible by day.
///
/// # Errors
///
/// Never fails for finite sizes.
pub fn scenic_city(width: f32, height: f32) -> SceneResult<SceneConfig> {
    let speed = FloatRange::new(1.0, 5.8);
    let stars = StarConfig {
        star_count: 25,
        spawn_area: SpawnArea::Rect {
            width,
            height: height * 0.5,
        },
        animation: StarAnimation::Twinkle,
        scale_range: FloatRange::new(0.8, 2.0),
        alpha_animation: WaveAnimation::enabled(speed, FloatRange::new(0.3, 1.0)),
        scale_animation: WaveAnimation::enabled(speed, FloatRange::new(1.35, 2.15)),
        ..StarConfig::default()
    };

    Ok(SceneConfig::new("scenic_city").with_layer(
        LayerConfig::stars("sky", stars)
            .with_texture("star")
            .with_visibility(
                VisibilityWindow::new(0.5, 1.0)
                    .with_fade_time(0.8)
                    .with_alphas(0.8, 0.1),
            ),
    ))
}

/// Pixel stars popping in and out over the upper half of a valley.
///
/// # Errors
///
/// Never fails for finite sizes; ramp construction is checked anyway.
pub fn celestia_valley(width: f32, height: f32) -> SceneResult<SceneConfig> {
    let stars = EmitterConfig::default()
        .with_max_particles(25)
        .with_lifetime(FloatRange::new(2.0, 3.0))
        .with_spawn_area(SpawnArea::Rect {
            width,
            height: height * 0.5,
        })
        .with_velocity(FloatRange::constant(0.0), FloatRange::constant(0.0))
        .with_scale(ScalarRamp::new([(0.3, 0.0), (0.5, 8.0), (0.7, 0.0)])?)
        .with_alpha(ScalarRamp::new([(0.3, 0.0), (0.5, 0.6), (0.7, 0.0)])?);

    Ok(SceneConfig::new("celestia_valley").with_layer(LayerConfig::particles("stars", stars).with_texture("pixel_star")))
}
