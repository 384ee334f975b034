//! # Display Tree
//!
//! The hand-off point between simulation and rendering. Emitters own a
//! [`Container`] and mutate its [`SpriteNode`]s during their own tick; the
//! renderer only reads it, or moves/fades the container as a whole.
//!
//! ```text
//! Emitter ──owns──> Container { position, alpha, visible }
//!                      └── NodePool<SpriteNode>
//!                             └── texture / blend mode (opaque, forwarded)
//!                                   │
//!                 write_instances() ▼
//!                      [SpriteInstance; N]  ──bytemuck──> GPU / canvas
//! ```

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::math::Vec2;
use crate::memory::{NodeId, NodePool};

/// Opaque handle to a drawable image owned by the renderer.
///
/// The engine never looks inside; it only forwards the handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// The renderer's plain white texture.
    pub const WHITE: Self = Self(0);
}

/// Compositing mode tag, forwarded untouched to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum BlendMode {
    /// Source-over alpha blending.
    #[default]
    Normal = 0,
    /// Additive blending, used for glows and lights.
    Add = 1,
    /// Multiplicative blending.
    Multiply = 2,
    /// Screen blending.
    Screen = 3,
}

/// A single drawable in a container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteNode {
    /// Position relative to the owning container.
    pub position: Vec2,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Opacity, 0.0-1.0.
    pub alpha: f32,
    /// Tint multiplied into the texture.
    pub tint: Rgb,
    /// Normalized pivot; (0.5, 0.5) centers the texture on `position`.
    pub anchor: Vec2,
    /// Texture to draw.
    pub texture: TextureHandle,
    /// Compositing mode.
    pub blend_mode: BlendMode,
    /// Hidden nodes stay in the tree but are not drawn.
    pub visible: bool,
}

impl SpriteNode {
    /// Creates a centered, untinted, fully opaque node.
    #[must_use]
    pub const fn new(texture: TextureHandle) -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            alpha: 1.0,
            tint: Rgb::WHITE,
            anchor: Vec2::splat(0.5),
            texture,
            blend_mode: BlendMode::Normal,
            visible: true,
        }
    }

    /// Sets the position.
    #[must_use]
    pub const fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    /// Sets the blend mode.
    #[must_use]
    pub const fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Sets a uniform scale.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec2::splat(scale);
    }
}

/// GPU-friendly flattened node (16-byte multiple for instance buffers).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Final position (container offset applied).
    pub position: [f32; 2],
    /// Per-axis scale.
    pub scale: [f32; 2],
    /// Normalized pivot.
    pub anchor: [f32; 2],
    /// Rotation in radians.
    pub rotation: f32,
    /// Final opacity (container alpha applied).
    pub alpha: f32,
    /// Packed `0xRRGGBB` tint.
    pub tint: u32,
    /// Texture handle.
    pub texture: u32,
    /// Blend mode discriminant.
    pub blend_mode: u32,
    /// Padding to 48 bytes.
    pub _padding: u32,
}

impl SpriteInstance {
    /// Size of an instance in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// An owned group of sprite nodes with a shared transform and opacity.
#[derive(Debug, Clone)]
pub struct Container {
    /// Offset applied to every child.
    pub position: Vec2,
    /// Opacity multiplied into every child.
    pub alpha: f32,
    /// Hidden containers draw nothing.
    pub visible: bool,
    nodes: NodePool<SpriteNode>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            alpha: 1.0,
            visible: true,
            nodes: NodePool::new(),
        }
    }

    /// Creates an empty container with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodePool::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Adds a node and returns its handle.
    pub fn add_child(&mut self, node: SpriteNode) -> NodeId {
        self.nodes.insert(node)
    }

    /// Removes a node, returning it if the handle was live.
    pub fn remove_child(&mut self, id: NodeId) -> Option<SpriteNode> {
        self.nodes.remove(id)
    }

    /// Looks up a node.
    #[must_use]
    pub fn child(&self, id: NodeId) -> Option<&SpriteNode> {
        self.nodes.get(id)
    }

    /// Looks up a node mutably.
    pub fn child_mut(&mut self, id: NodeId) -> Option<&mut SpriteNode> {
        self.nodes.get_mut(id)
    }

    /// Iterates over every node.
    pub fn children(&self) -> impl Iterator<Item = (NodeId, &SpriteNode)> {
        self.nodes.iter()
    }

    /// Number of nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the container holds no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Appends one [`SpriteInstance`] per visible node to `out`.
    ///
    /// The container's offset and alpha are folded in. Returns the number
    /// of instances written.
    pub fn write_instances(&self, out: &mut Vec<SpriteInstance>) -> usize {
        if !self.visible {
            return 0;
        }

        let before = out.len();
        out.extend(self.nodes.iter().filter(|(_, n)| n.visible).map(|(_, n)| SpriteInstance {
            position: (n.position + self.position).to_array(),
            scale: n.scale.to_array(),
            anchor: n.anchor.to_array(),
            rotation: n.rotation,
            alpha: n.alpha * self.alpha,
            tint: n.tint.packed(),
            texture: n.texture.0,
            blend_mode: n.blend_mode as u32,
            _padding: 0,
        }));
        out.len() - before
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
