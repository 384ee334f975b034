//! # Memory Management
//!
//! Pooled storage for display nodes.
//!
//! Particles come and go every frame; their nodes recycle slots instead of
//! reshuffling a vector, and stale handles are rejected by generation.

mod pool;

pub use pool::{NodeId, NodePool};
