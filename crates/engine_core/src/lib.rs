//! Core types shared by the generator and whatever renders its output.
//!
//! This crate provides the foundational types used across the workspace:
//! - Mesh data handed to the renderer (positions, triangles, colours)
//! - Placement transforms for planets, moons and tree anchors
//! - Wall-clock measurement for generation diagnostics

pub mod mesh;
pub mod time;
pub mod transform;

pub use mesh::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec3};
