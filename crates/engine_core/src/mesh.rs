//! Triangle mesh data in the shape the renderer consumes.
//!
//! The generator never touches a graphics API. It produces parallel arrays of
//! positions, triangle indices and per-vertex colours; the renderer uploads them.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColoredVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// An indexed triangle mesh with optional per-vertex colours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// Vertex indices, winding preserved from the source.
    pub triangles: Vec<[u32; 3]>,
    /// Parallel to `positions` when non-empty.
    pub colors: Vec<Vec3>,
}

impl MeshData {
    /// Create an uncoloured mesh.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
            colors: Vec::new(),
        }
    }

    /// Attach per-vertex colours. Length must match the vertex count.
    pub fn with_colors(mut self, colors: Vec<Vec3>) -> Self {
        assert_eq!(
            colors.len(),
            self.positions.len(),
            "colour array must be parallel to the vertex array"
        );
        self.colors = colors;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }

    /// True when every triangle references an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let n = self.positions.len() as u32;
        self.triangles.iter().flatten().all(|&i| i < n)
    }

    /// Build interleaved vertices with smooth normals.
    ///
    /// Normals are the area-weighted sum of adjacent face normals. Vertices
    /// without colours come out white.
    pub fn interleave(&self) -> Vec<ColoredVertex> {
        if !self.colors.is_empty() && self.colors.len() < self.positions.len() {
            log::warn!(
                "mesh has {} colours for {} vertices, filling the rest with white",
                self.colors.len(),
                self.positions.len()
            );
        }
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for &[a, b, c] in &self.triangles {
            let (pa, pb, pc) = (
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            );
            let face = (pb - pa).cross(pc - pa);
            normals[a as usize] += face;
            normals[b as usize] += face;
            normals[c as usize] += face;
        }

        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let color = self.colors.get(i).copied().unwrap_or(Vec3::ONE);
                ColoredVertex {
                    position: p.to_array(),
                    normal: normals[i].normalize_or_zero().to_array(),
                    color: color.to_array(),
                }
            })
            .collect()
    }
}

/// Consumer of generated meshes (GPU upload, export, ...).
pub trait MeshSink {
    fn submit(&mut self, label: &str, mesh: &MeshData) -> anyhow::Result<()>;
}
