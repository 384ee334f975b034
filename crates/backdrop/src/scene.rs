//! # Scenes
//!
//! A scene is an ordered stack of effect layers (back to front). Each layer
//! wraps one particle or star emitter, optionally faded in and out by a
//! [`VisibilityWindow`] keyed on the scene's progress value.
//!
//! ```text
//! SceneConfig (TOML / preset)
//!   └─ [[layers]] name, position, texture, particles | stars, visibility
//!            │ Scene::build(config, &TextureRegistry, seed)
//!            ▼
//! Scene { layers: [Layer { effect, visibility }], progress }
//!            │ tick(dt, progress)
//!            ▼
//!   effect.update(dt) -> window.apply(container, dt, progress)
//! ```

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::Path;

use backdrop_core::{Container, SpriteInstance, TextureHandle, Vec2};
use backdrop_effects::{
    EffectsError, EmitterConfig, ParticleEmitter, StarConfig, StarEmitter, Tickable, Validate,
    VisibilityWindow,
};
use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Maps texture names used in scene files to renderer handles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextureRegistry {
    textures: HashMap<String, TextureHandle>,
}

impl TextureRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every name with consecutive handles starting at 1.
    ///
    /// Handy for headless runs where no renderer hands out real handles.
    #[must_use]
    pub fn sequential<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (handle, name) in (1..).zip(names) {
            registry.register(name, TextureHandle(handle));
        }
        registry
    }

    /// Registers a texture, returning the handle it replaced.
    pub fn register(&mut self, name: impl Into<String>, handle: TextureHandle) -> Option<TextureHandle> {
        self.textures.insert(name.into(), handle)
    }

    /// Looks up a texture by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }

    /// Number of registered textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve(&self, layer: &str, name: &str) -> SceneResult<TextureHandle> {
        self.get(name).ok_or_else(|| SceneError::UnknownTexture {
            layer: layer.to_string(),
            texture: name.to_string(),
        })
    }
}

/// One layer of a scene file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Layer name, unique within the scene.
    pub name: String,
    /// Container offset.
    pub position: Vec2,
    /// Texture name for particles or stars; overrides the config's handle.
    pub texture: Option<String>,
    /// Texture name for particle lights.
    pub light_texture: Option<String>,
    /// Particle emitter, if this is a particle layer.
    pub particles: Option<EmitterConfig>,
    /// Star emitter, if this is a star layer.
    pub stars: Option<StarConfig>,
    /// Fade window over scene progress.
    pub visibility: Option<VisibilityWindow>,
}

impl LayerConfig {
    /// A particle layer.
    #[must_use]
    pub fn particles(name: impl Into<String>, config: EmitterConfig) -> Self {
        Self {
            name: name.into(),
            particles: Some(config),
            ..Self::default()
        }
    }

    /// A star layer.
    #[must_use]
    pub fn stars(name: impl Into<String>, config: StarConfig) -> Self {
        Self {
            name: name.into(),
            stars: Some(config),
            ..Self::default()
        }
    }

    /// Sets the container offset.
    #[must_use]
    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Sets the texture name.
    #[must_use]
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    /// Sets the light texture name.
    #[must_use]
    pub fn with_light_texture(mut self, texture: impl Into<String>) -> Self {
        self.light_texture = Some(texture.into());
        self
    }

    /// Fades the layer by scene progress.
    #[must_use]
    pub fn with_visibility(mut self, window: VisibilityWindow) -> Self {
        self.visibility = Some(window);
        self
    }

    fn validate(&self) -> SceneResult<()> {
        match (&self.particles, &self.stars) {
            (Some(particles), None) => particles.validate()?,
            (None, Some(stars)) => stars.validate()?,
            _ => {
                return Err(SceneError::AmbiguousLayer {
                    layer: self.name.clone(),
                })
            }
        }
        if let Some(window) = &self.visibility {
            window.validate()?;
        }
        Ok(())
    }
}

/// A scene file: layers from back to front.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene name.
    pub name: String,
    /// Layers, drawn in order.
    pub layers: Vec<LayerConfig>,
}

impl SceneConfig {
    /// Creates an empty scene config.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
        }
    }

    /// Appends a layer in front of the existing ones.
    #[must_use]
    pub fn with_layer(mut self, layer: LayerConfig) -> Self {
        self.layers.push(layer);
        self
    }

    /// Checks every layer.
    ///
    /// # Errors
    ///
    /// Returns the first invalid layer's error.
    pub fn validate(&self) -> SceneResult<()> {
        self.layers.iter().try_for_each(LayerConfig::validate)
    }

    /// Parses and validates a scene from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error.
    pub fn from_toml_str(content: &str) -> SceneResult<Self> {
        let config: Self = toml::from_str(content).map_err(EffectsError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a scene file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse or validation error.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(EffectsError::from)?;
        tracing::debug!(path = %path.display(), "loading scene");
        Self::from_toml_str(&content)
    }

    /// Serializes the scene as TOML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error.
    pub fn to_toml_string(&self) -> SceneResult<String> {
        Ok(backdrop_effects::config::to_toml_string(self)?)
    }
}

/// The emitter inside a layer.
#[derive(Debug)]
pub enum LayerEffect {
    /// A particle emitter.
    Particles(ParticleEmitter),
    /// A star field.
    Stars(StarEmitter),
}

impl LayerEffect {
    /// Starts the emitter.
    pub fn start(&mut self) {
        match self {
            Self::Particles(emitter) => emitter.start(),
            Self::Stars(stars) => stars.start(),
        }
    }

    /// Stops the emitter.
    pub fn stop(&mut self) {
        match self {
            Self::Particles(emitter) => emitter.stop(),
            Self::Stars(stars) => stars.stop(),
        }
    }

    /// Advances the emitter.
    pub fn update(&mut self, dt: f32) {
        match self {
            Self::Particles(emitter) => emitter.update(dt),
            Self::Stars(stars) => stars.update(dt),
        }
    }

    /// The emitter's container.
    #[must_use]
    pub const fn container(&self) -> &Container {
        match self {
            Self::Particles(emitter) => emitter.container(),
            Self::Stars(stars) => stars.container(),
        }
    }

    /// The emitter's container, mutably.
    pub fn container_mut(&mut self) -> &mut Container {
        match self {
            Self::Particles(emitter) => emitter.container_mut(),
            Self::Stars(stars) => stars.container_mut(),
        }
    }

    /// Live particles or stars.
    #[must_use]
    pub fn population(&self) -> usize {
        match self {
            Self::Particles(emitter) => emitter.live_count(),
            Self::Stars(stars) => stars.star_count(),
        }
    }

    /// Pool capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match self {
            Self::Particles(emitter) => emitter.config().max_particles as usize,
            Self::Stars(stars) => stars.config().star_count as usize,
        }
    }
}

/// A built scene layer.
#[derive(Debug)]
pub struct Layer {
    name: String,
    effect: LayerEffect,
    visibility: Option<VisibilityWindow>,
}

impl Layer {
    /// Layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layer's emitter.
    #[must_use]
    pub const fn effect(&self) -> &LayerEffect {
        &self.effect
    }

    /// The layer's emitter, mutably.
    pub fn effect_mut(&mut self) -> &mut LayerEffect {
        &mut self.effect
    }

    /// The layer's fade window.
    #[must_use]
    pub const fn visibility(&self) -> Option<&VisibilityWindow> {
        self.visibility.as_ref()
    }

    fn tick(&mut self, dt: f32, progress: f32) {
        self.effect.update(dt);
        if let Some(window) = &self.visibility {
            window.apply(self.effect.container_mut(), dt, progress);
        }
    }
}

/// A running stack of effect layers.
#[derive(Debug)]
pub struct Scene {
    name: String,
    layers: Vec<Layer>,
    progress: f32,
}

impl Scene {
    /// Builds every layer. Emitters start stopped.
    ///
    /// With a seed, layer `i` is seeded with `seed + i`; otherwise every
    /// layer draws from entropy.
    ///
    /// # Errors
    ///
    /// Returns the first invalid layer or unknown texture.
    pub fn build(config: &SceneConfig, textures: &TextureRegistry, seed: Option<u64>) -> SceneResult<Self> {
        config.validate()?;

        let mut layers = Vec::with_capacity(config.layers.len());
        for (index, layer) in (0_u64..).zip(&config.layers) {
            let layer_seed = seed.map(|s| s.wrapping_add(index));
            let mut effect = build_effect(layer, textures, layer_seed)?;

            let container = effect.container_mut();
            container.position = layer.position;
            if layer.visibility.is_some() {
                container.alpha = VisibilityWindow::INITIAL_ALPHA;
            }

            layers.push(Layer {
                name: layer.name.clone(),
                effect,
                visibility: layer.visibility,
            });
        }

        tracing::debug!(scene = %config.name, layers = layers.len(), "scene built");
        Ok(Self {
            name: config.name.clone(),
            layers,
            progress: 0.0,
        })
    }

    /// Starts every layer.
    pub fn start(&mut self) {
        self.layers.iter_mut().for_each(|layer| layer.effect.start());
    }

    /// Stops every layer.
    pub fn stop(&mut self) {
        self.layers.iter_mut().for_each(|layer| layer.effect.stop());
    }

    /// Advances every layer by `dt` at scene progress `progress`.
    pub fn tick(&mut self, dt: f32, progress: f32) {
        self.progress = progress;
        for layer in &mut self.layers {
            layer.tick(dt, progress);
        }
    }

    /// Sets the progress used by [`Tickable::on_tick`].
    pub fn set_progress(&mut self, progress: f32) {
        self.progress = progress;
    }

    /// Current progress.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Scene name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Layers, back to front.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Looks up a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Looks up a layer by name, mutably.
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.name == name)
    }

    /// Flattens every layer into draw order. Returns instances written.
    pub fn write_instances(&self, out: &mut Vec<SpriteInstance>) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.effect.container().write_instances(out))
            .sum()
    }
}

impl Tickable for Scene {
    fn on_tick(&mut self, dt: f32) {
        let progress = self.progress;
        self.tick(dt, progress);
    }
}

fn build_effect(layer: &LayerConfig, textures: &TextureRegistry, seed: Option<u64>) -> SceneResult<LayerEffect> {
    let texture = layer
        .texture
        .as_deref()
        .map(|name| textures.resolve(&layer.name, name))
        .transpose()?;
    let light_texture = layer
        .light_texture
        .as_deref()
        .map(|name| textures.resolve(&layer.name, name))
        .transpose()?;

    if let Some(particles) = &layer.particles {
        let mut config = particles.clone();
        if let Some(handle) = texture {
            config.texture = handle;
        }
        if let (Some(handle), Some(light)) = (light_texture, config.light.as_mut()) {
            light.texture = handle;
        }
        let emitter = match seed {
            Some(seed) => ParticleEmitter::with_seed(config, seed)?,
            None => ParticleEmitter::new(config)?,
        };
        return Ok(LayerEffect::Particles(emitter));
    }

    if let Some(stars) = &layer.stars {
        let mut config = stars.clone();
        if let Some(handle) = texture {
            config.texture = handle;
        }
        let stars = match seed {
            Some(seed) => StarEmitter::with_seed(config, seed)?,
            None => StarEmitter::new(config)?,
        };
        return Ok(LayerEffect::Stars(stars));
    }

    Err(SceneError::AmbiguousLayer {
        layer: layer.name.clone(),
    })
}

/// A progress value that swings `0 -> 1 -> 0` over a day/night cycle.
///
/// `progress = 0.5 + 0.5 * sin(2π * elapsed / cycle_seconds)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayNightCycle {
    cycle_seconds: f32,
    elapsed: f32,
}

impl DayNightCycle {
    /// A cycle of `cycle_seconds`. Non-positive lengths freeze at 0.5.
    #[must_use]
    pub const fn new(cycle_seconds: f32) -> Self {
        Self {
            cycle_seconds,
            elapsed: 0.0,
        }
    }

    /// Advances and returns the new progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        if self.cycle_seconds > 0.0 {
            self.elapsed %= self.cycle_seconds;
        }
        self.progress()
    }

    /// Current progress in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.cycle_seconds <= 0.0 {
            return 0.5;
        }
        0.5 + 0.5 * (TAU * self.elapsed / self.cycle_seconds).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::FloatRange;

    fn two_layer_config() -> SceneConfig {
        SceneConfig::new("test")
            .with_layer(
                LayerConfig::particles(
                    "sparks",
                    EmitterConfig::default()
                        .with_max_particles(8)
                        .with_lifetime(FloatRange::constant(2.0))
                        .with_explosiveness(1.0),
                )
                .with_texture("spark")
                .at(Vec2::new(0.0, 100.0)),
            )
            .with_layer(
                LayerConfig::stars(
                    "sky",
                    StarConfig {
                        star_count: 5,
                        ..StarConfig::default()
                    },
                )
                .with_visibility(VisibilityWindow::new(0.5, 1.0).with_fade_time(0.5)),
            )
    }

    #[test]
    fn test_registry() {
        let mut textures = TextureRegistry::sequential(["a", "b"]);
        assert_eq!(textures.get("a"), Some(TextureHandle(1)));
        assert_eq!(textures.get("b"), Some(TextureHandle(2)));
        assert_eq!(textures.register("a", TextureHandle(9)), Some(TextureHandle(1)));
        assert_eq!(textures.len(), 2);
        assert!(textures.get("missing").is_none());
    }

    #[test]
    fn test_build_resolves_textures_and_positions() {
        let textures = TextureRegistry::sequential(["spark"]);
        let mut scene = Scene::build(&two_layer_config(), &textures, Some(1)).unwrap();
        scene.start();

        let sparks = scene.layer("sparks").unwrap();
        assert_eq!(sparks.effect().population(), 8);
        assert_eq!(sparks.effect().container().position, Vec2::new(0.0, 100.0));
        assert!(sparks
            .effect()
            .container()
            .children()
            .all(|(_, node)| node.texture == TextureHandle(1)));

        let sky = scene.layer("sky").unwrap();
        assert_eq!(sky.effect().population(), 5);
        assert_eq!(sky.effect().container().alpha, 0.0);
    }

    #[test]
    fn test_unknown_texture() {
        let err = Scene::build(&two_layer_config(), &TextureRegistry::new(), Some(1)).unwrap_err();
        assert!(matches!(err, SceneError::UnknownTexture { .. }));
    }

    #[test]
    fn test_ambiguous_layer() {
        let mut layer = LayerConfig::particles("both", EmitterConfig::default());
        layer.stars = Some(StarConfig::default());
        let config = SceneConfig::new("bad").with_layer(layer);
        assert!(matches!(config.validate(), Err(SceneError::AmbiguousLayer { .. })));

        let empty = SceneConfig::new("bad").with_layer(LayerConfig::default());
        assert!(matches!(empty.validate(), Err(SceneError::AmbiguousLayer { .. })));
    }

    #[test]
    fn test_visibility_follows_progress() {
        let textures = TextureRegistry::sequential(["spark"]);
        let mut scene = Scene::build(&two_layer_config(), &textures, Some(2)).unwrap();
        scene.start();

        for _ in 0..120 {
            scene.tick(1.0 / 60.0, 0.75);
        }
        let lit = scene.layer("sky").unwrap().effect().container().alpha;
        assert!(lit > 0.9, "alpha {lit}");

        for _ in 0..120 {
            scene.tick(1.0 / 60.0, 0.1);
        }
        let dark = scene.layer("sky").unwrap().effect().container().alpha;
        assert!(dark < 0.1, "alpha {dark}");

        // Layers without a window are unaffected.
        assert_eq!(scene.layer("sparks").unwrap().effect().container().alpha, 1.0);
    }

    #[test]
    fn test_tickable_uses_stored_progress() {
        let textures = TextureRegistry::sequential(["spark"]);
        let mut scene = Scene::build(&two_layer_config(), &textures, Some(3)).unwrap();
        scene.start();
        scene.set_progress(0.9);
        for _ in 0..60 {
            scene.on_tick(1.0 / 60.0);
        }
        assert!(scene.layer("sky").unwrap().effect().container().alpha > 0.5);
    }

    #[test]
    fn test_write_instances_in_layer_order() {
        let textures = TextureRegistry::sequential(["spark"]);
        let mut scene = Scene::build(&two_layer_config(), &textures, Some(4)).unwrap();
        scene.start();

        let mut out = Vec::new();
        assert_eq!(scene.write_instances(&mut out), 13);
        assert!(out[..8].iter().all(|i| i.texture == 1));
        assert!(out[8..].iter().all(|i| i.alpha == 0.0));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = two_layer_config();
        let text = config.to_toml_string().unwrap();
        let back = SceneConfig::from_toml_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_day_night_cycle() {
        let mut cycle = DayNightCycle::new(4.0);
        assert!((cycle.progress() - 0.5).abs() < 1e-6);
        assert!((cycle.advance(1.0) - 1.0).abs() < 1e-6);
        assert!((cycle.advance(2.0) - 0.0).abs() < 1e-6);
        assert!((DayNightCycle::new(0.0).advance(5.0) - 0.5).abs() < 1e-6);
    }
}
