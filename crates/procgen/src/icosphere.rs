//! Icosphere construction: a unit icosahedron refined by edge-midpoint subdivision.
//!
//! Every pass replaces each triangle `(a, b, c)` with four:
//! `(a, ab, ca)`, `(b, bc, ab)`, `(c, ca, bc)`, `(ab, bc, ca)`.
//! Midpoints are memoised per undirected edge so neighbouring triangles share
//! one vertex and the mesh stays watertight. Vertices are only ever appended,
//! so existing indices stay valid across passes.

use std::collections::HashMap;

use engine_core::MeshData;
use glam::Vec3;

/// Highest subdivision level callers should request. Triangle count is `20 * 4^n`.
pub const MAX_SUBDIVISIONS: u32 = 3;

/// Index of a vertex in an [`IcoSphere`]'s vertex buffer.
pub type VertexIndex = u32;

/// Triangles of the canonical icosahedron.
const ICOSAHEDRON_TRIANGLES: [[VertexIndex; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Vertex buffer plus triangle list of a (possibly subdivided) icosahedron.
#[derive(Debug, Clone, PartialEq)]
pub struct IcoSphere {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[VertexIndex; 3]>,
}

impl IcoSphere {
    /// The 12-vertex, 20-triangle icosahedron with every vertex on the unit sphere.
    pub fn icosahedron() -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let vertices = [
            Vec3::new(-1.0, t, 0.0),
            Vec3::new(1.0, t, 0.0),
            Vec3::new(-1.0, -t, 0.0),
            Vec3::new(1.0, -t, 0.0),
            Vec3::new(0.0, -1.0, t),
            Vec3::new(0.0, 1.0, t),
            Vec3::new(0.0, -1.0, -t),
            Vec3::new(0.0, 1.0, -t),
            Vec3::new(t, 0.0, -1.0),
            Vec3::new(t, 0.0, 1.0),
            Vec3::new(-t, 0.0, -1.0),
            Vec3::new(-t, 0.0, 1.0),
        ]
        .into_iter()
        .map(Vec3::normalize)
        .collect();

        Self {
            vertices,
            triangles: ICOSAHEDRON_TRIANGLES.to_vec(),
        }
    }

    /// Icosahedron subdivided `levels` times.
    pub fn new(levels: u32) -> Self {
        let mut sphere = Self::icosahedron();
        sphere.subdivide(levels);
        debug_assert_eq!(sphere.vertex_count(), vertex_count_for(levels));
        sphere
    }

    /// Run `levels` subdivision passes in place.
    ///
    /// One midpoint cache spans all passes of this call. The triangle list is
    /// rebuilt each pass; the vertex buffer only grows.
    pub fn subdivide(&mut self, levels: u32) {
        let mut cache = MidpointCache::default();
        for _ in 0..levels {
            let mut next = Vec::with_capacity(self.triangles.len() * 4);
            for &[a, b, c] in &self.triangles {
                let ab = cache.midpoint(&mut self.vertices, a, b);
                let bc = cache.midpoint(&mut self.vertices, b, c);
                let ca = cache.midpoint(&mut self.vertices, c, a);
                next.push([a, ab, ca]);
                next.push([b, bc, ab]);
                next.push([c, ca, bc]);
                next.push([ab, bc, ca]);
            }
            self.triangles = next;
        }
        log::debug!(
            "subdivided {} levels: {} edges split, {} vertices, {} triangles",
            levels,
            cache.len(),
            self.vertices.len(),
            self.triangles.len()
        );
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Copy into renderer-facing mesh data, uncoloured.
    pub fn to_mesh(&self) -> MeshData {
        MeshData::new(self.vertices.clone(), self.triangles.clone())
    }
}

/// Expected triangle count after `levels` passes.
pub fn triangle_count_for(levels: u32) -> usize {
    20 * 4usize.pow(levels)
}

/// Expected vertex count after `levels` passes (Euler: `V = 10 * 4^n + 2`).
pub fn vertex_count_for(levels: u32) -> usize {
    10 * 4usize.pow(levels) + 2
}

/// Maps an undirected edge to the vertex created at its midpoint.
///
/// Keys are canonicalised as `(min, max)` so `(a, b)` and `(b, a)` hit the same
/// entry. Entries are written once and read many times.
#[derive(Debug, Default)]
pub struct MidpointCache {
    edges: HashMap<(VertexIndex, VertexIndex), VertexIndex>,
}

impl MidpointCache {
    /// Index of the midpoint vertex of edge `(a, b)`, appending it on first use.
    ///
    /// The new vertex is the lerp at `t = 0.5` projected back onto the unit sphere.
    pub fn midpoint(&mut self, vertices: &mut Vec<Vec3>, a: VertexIndex, b: VertexIndex) -> VertexIndex {
        let key = (a.min(b), a.max(b));
        if let Some(&index) = self.edges.get(&key) {
            return index;
        }

        let p1 = vertices[key.0 as usize];
        let p2 = vertices[key.1 as usize];
        let mid = p1.lerp(p2, 0.5).normalize();

        let index = vertices.len() as VertexIndex;
        vertices.push(mid);
        self.edges.insert(key, index);
        index
    }

    /// Number of distinct edges split so far.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn icosahedron_has_12_unit_vertices_and_20_triangles() {
        let ico = IcoSphere::icosahedron();
        assert_eq!(ico.vertex_count(), 12);
        assert_eq!(ico.triangle_count(), 20);
        for v in &ico.vertices {
            assert!((v.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn subdivision_growth_matches_closed_form() {
        for levels in 0..=MAX_SUBDIVISIONS {
            let sphere = IcoSphere::new(levels);
            assert_eq!(sphere.triangle_count(), triangle_count_for(levels));
            assert_eq!(sphere.vertex_count(), vertex_count_for(levels));
            let bound = sphere.vertex_count() as u32;
            assert!(sphere.triangles.iter().flatten().all(|&i| i < bound));
        }
    }

    #[test]
    fn vertex_count_is_base_plus_unique_edges() {
        let mut sphere = IcoSphere::icosahedron();
        let mut cache = MidpointCache::default();
        let mut next = Vec::new();
        for &[a, b, c] in &sphere.triangles.clone() {
            let ab = cache.midpoint(&mut sphere.vertices, a, b);
            let bc = cache.midpoint(&mut sphere.vertices, b, c);
            let ca = cache.midpoint(&mut sphere.vertices, c, a);
            next.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        // 30 edges on an icosahedron
        assert_eq!(cache.len(), 30);
        assert_eq!(sphere.vertex_count(), 12 + cache.len());
    }

    #[test]
    fn midpoint_is_memoised_for_either_edge_direction() {
        let mut vertices = IcoSphere::icosahedron().vertices;
        let mut cache = MidpointCache::default();
        let first = cache.midpoint(&mut vertices, 0, 11);
        let again = cache.midpoint(&mut vertices, 0, 11);
        let reversed = cache.midpoint(&mut vertices, 11, 0);
        assert_eq!(first, again);
        assert_eq!(first, reversed);
        assert_eq!(vertices.len(), 13);
        assert!((vertices[first as usize].length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn subdivided_vertices_stay_on_unit_sphere() {
        let sphere = IcoSphere::new(2);
        for v in &sphere.vertices {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    /// Every edge of a closed mesh is shared by exactly two triangles.
    #[test]
    fn subdivided_mesh_is_watertight() {
        let sphere = IcoSphere::new(2);
        let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
        for &[a, b, c] in &sphere.triangles {
            for (x, y) in [(a, b), (b, c), (c, a)] {
                *counts.entry((x.min(y), x.max(y))).or_default() += 1;
            }
        }
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn no_duplicate_positions_after_subdivision() {
        let sphere = IcoSphere::new(3);
        let unique: HashSet<[i64; 3]> = sphere
            .vertices
            .iter()
            .map(|v| {
                let q = (*v * 1e5).round();
                [q.x as i64, q.y as i64, q.z as i64]
            })
            .collect();
        assert_eq!(unique.len(), sphere.vertex_count());
    }

    #[test]
    fn subdivide_keeps_original_vertices_in_place() {
        let base = IcoSphere::icosahedron();
        let sphere = IcoSphere::new(2);
        assert_eq!(&sphere.vertices[..12], &base.vertices[..]);
    }
}
