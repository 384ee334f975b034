//! # BACKDROP
//!
//! Animated decorative background scenes assembled from particle and star
//! emitter layers.
//!
//! ## Frame Flow
//!
//! ```text
//! host loop (requestAnimationFrame, winit, headless)
//!      │ dt
//!      ▼
//! Ticker ── on_tick(dt) ──> Scene ──> Layer ──> ParticleEmitter | StarEmitter
//!                              │                        │
//!                              │ progress               ▼
//!                              └──────────> VisibilityWindow ──> Container
//!                                                                   │
//!                                          write_instances ◄────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use backdrop::{presets, Scene, TextureRegistry};
//!
//! let config = presets::preset("ambient_orbs", 1920.0, 1080.0).unwrap();
//! let textures = TextureRegistry::sequential(presets::TEXTURE_NAMES);
//! let mut scene = Scene::build(&config, &textures, Some(7)).unwrap();
//! scene.start();
//! scene.tick(1.0 / 60.0, 0.5);
//!
//! let mut instances = Vec::new();
//! scene.write_instances(&mut instances);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod presets;
pub mod scene;
pub mod ticker;

pub use error::{SceneError, SceneResult};
pub use scene::{DayNightCycle, Layer, LayerConfig, LayerEffect, Scene, SceneConfig, TextureRegistry};
pub use ticker::{FrameStats, Ticker, TickerId, TickerStats, LONG_FRAME_TIME, TARGET_FRAME_TIME};
