//! # BACKDROP Core
//!
//! Shared primitives for the decorative scene engine:
//! - 2D vectors and packed `0xRRGGBB` colors
//! - A generational node pool with stable handles
//! - The display tree (`Container` of `SpriteNode`s) the renderer composites
//! - Seedable random sampling with non-fatal range validation
//!
//! ## Architecture Rules
//!
//! 1. **Opaque handles** - textures and blend modes are forwarded, never interpreted
//! 2. **No global state** - every emitter owns its container and its RNG
//! 3. **Pre-sized pools** - containers reserve their node slots up front
//!
//! ## Example
//!
//! ```rust
//! use backdrop_core::{Container, SpriteNode, TextureHandle, Vec2};
//!
//! let mut container = Container::with_capacity(8);
//! let id = container.add_child(SpriteNode::new(TextureHandle::WHITE).at(Vec2::new(4.0, 2.0)));
//! assert_eq!(container.child(id).map(|n| n.position), Some(Vec2::new(4.0, 2.0)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod display;
pub mod math;
pub mod memory;
pub mod range;

pub use color::Rgb;
pub use display::{BlendMode, Container, SpriteInstance, SpriteNode, TextureHandle};
pub use math::Vec2;
pub use memory::{NodeId, NodePool};
pub use range::{seeded_rng, entropy_rng, FloatRange};
