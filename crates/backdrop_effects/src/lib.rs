//! # BACKDROP Effects
//!
//! Frame-driven simulation of decorative particle and star fields.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  application loop ── on_tick(dt) ──> Tickable                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ParticleEmitter                     StarEmitter              │
//! │    EmitterClock (phase sweep)          per-star sine waves    │
//! │    slot scheduler ─> spawn             presets                │
//! │    age / cull ─> integrate             drift bounds           │
//! │    Ramp<f32> / Ramp<Rgb>                                      │
//! │            │                               │                  │
//! │            └──────────> Container <────────┘                  │
//! │                            │  VisibilityWindow (fade)         │
//! └────────────────────────────┼─────────────────────────────────┘
//!                              ▼ renderer
//! ```
//!
//! ## Rules
//!
//! - Configuration errors surface at construction or reconfiguration,
//!   never during `update`.
//! - A malformed numeric range warns and samples `0.0`.
//! - Every emitter owns its RNG; seed it for reproducible runs.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod emitter;
pub mod error;
pub mod ramp;
pub mod star;
pub mod tick;
pub mod visibility;

pub use config::Validate;
pub use emitter::{
    ClockAdvance, EmitterClock, EmitterConfig, EmitterStats, LightConfig, Particle, ParticleEmitter,
    SpawnArea, VelocityConfig,
};
pub use error::{EffectsError, EffectsResult};
pub use ramp::{ColorRamp, Ramp, RampKey, RampKind, RampValue, ScalarRamp, UntypedRamp};
pub use star::{
    ColorAnimation, DriftBounds, DriftConfig, PhaseMode, StarAnimation, StarConfig, StarEmitter,
    WaveAnimation,
};
pub use tick::Tickable;
pub use visibility::VisibilityWindow;
