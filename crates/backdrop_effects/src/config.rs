//! # Configuration Loading
//!
//! Every effect config is plain serde data with `#[serde(default)]`, so a
//! TOML document only names the fields it changes. Loading always
//! validates; a config that parses but cannot drive an effect is rejected
//! here rather than on the first tick.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EffectsResult;

/// A configuration that can check its own values.
pub trait Validate {
    /// Returns an error describing the first invalid value.
    ///
    /// # Errors
    ///
    /// Implementations return the matching [`crate::EffectsError`] variant.
    fn validate(&self) -> EffectsResult<()>;
}

/// Parses and validates a config from TOML text.
///
/// # Errors
///
/// Returns a parse error or the config's validation error.
pub fn from_toml_str<T>(content: &str) -> EffectsResult<T>
where
    T: DeserializeOwned + Validate,
{
    let config: T = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a config file.
///
/// # Errors
///
/// Returns an I/O error, a parse error or the config's validation error.
pub fn from_toml_file<T, P>(path: P) -> EffectsResult<T>
where
    T: DeserializeOwned + Validate,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading config");
    from_toml_str(&content)
}

/// Serializes a config as pretty TOML.
///
/// # Errors
///
/// Returns a serialization error.
pub fn to_toml_string<T: Serialize>(config: &T) -> EffectsResult<String> {
    Ok(toml::to_string_pretty(config)?)
}
