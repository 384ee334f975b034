//! # Effects Error Types
//!
//! All errors that can occur while building or reconfiguring an effect.
//! Runtime ticks never fail; everything here is caught at construction.

use thiserror::Error;

/// Errors that can occur in the effects system.
#[derive(Error, Debug)]
pub enum EffectsError {
    /// A ramp was configured without any keys.
    #[error("ramp has no keys")]
    EmptyRamp,

    /// A ramp key is not a finite number in [0, 1].
    #[error("ramp key `{key}` is not a normalized time in [0, 1]")]
    InvalidRampKey {
        /// The offending key as written.
        key: String,
    },

    /// The lifetime range cannot drive a schedule.
    #[error("invalid lifetime [{min}, {max}]: bounds must be finite, positive and ordered")]
    InvalidLifetime {
        /// Configured minimum lifetime.
        min: f32,
        /// Configured maximum lifetime.
        max: f32,
    },

    /// A pool must hold at least one element.
    #[error("{what} must be at least 1")]
    InvalidCapacity {
        /// Which count was zero.
        what: &'static str,
    },

    /// Explosiveness outside [0, 1].
    #[error("explosiveness {0} is outside [0, 1]")]
    InvalidExplosiveness(f32),

    /// Any other invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration could not be written as TOML.
    #[error("failed to serialize configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for effects operations.
pub type EffectsResult<T> = Result<T, EffectsError>;
