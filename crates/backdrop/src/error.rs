//! # Scene Error Types

use backdrop_effects::EffectsError;
use thiserror::Error;

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// An emitter or config file was rejected.
    #[error(transparent)]
    Effects(#[from] EffectsError),

    /// A layer names a texture the registry does not know.
    #[error("layer `{layer}` uses unknown texture `{texture}`")]
    UnknownTexture {
        /// Layer name.
        layer: String,
        /// Texture name.
        texture: String,
    },

    /// A layer is not exactly one of particles or stars.
    #[error("layer `{layer}` must define exactly one of `particles` or `stars`")]
    AmbiguousLayer {
        /// Layer name.
        layer: String,
    },

    /// No built-in preset has this name.
    #[error("unknown preset `{0}` (available: ambient_orbs, firefly_forest, scenic_city, dusty_background, celestia_valley)")]
    UnknownPreset(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
