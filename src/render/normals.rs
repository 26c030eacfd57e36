//! Smooth per-vertex normals from an indexed triangle list
//!
//! Every vertex gets the normalized sum of the unit face normals of the
//! triangles touching it (unweighted average). The face normal of triangle
//! (A, B, C) is `normalize((A - B) x (C - B))`.
//!
//! Degenerate triangles and triangles with out-of-range indices contribute
//! nothing. A vertex whose contributions cancel out, or that no triangle
//! references, keeps the zero vector.

use glam::Vec3;

/// Squared length below which a cross product counts as degenerate.
const DEGENERATE_EPSILON: f32 = 1e-12;

/// Triangles touching each vertex, stored as one flat list with per-vertex offsets.
pub struct VertexAdjacency {
    offsets: Vec<u32>,
    triangles: Vec<u32>,
}

impl VertexAdjacency {
    pub fn build(vertex_count: usize, triangles: &[[u32; 3]]) -> Self {
        let mut counts = vec![0u32; vertex_count + 1];
        for tri in triangles.iter().filter(|tri| in_range(tri, vertex_count)) {
            for &index in tri {
                counts[index as usize + 1] += 1;
            }
        }
        for i in 1..counts.len() {
            counts[i] += counts[i - 1];
        }
        let offsets = counts;

        let mut cursor = offsets.clone();
        let mut flat = vec![0u32; offsets[vertex_count] as usize];
        for (tri_index, tri) in triangles.iter().enumerate() {
            if !in_range(tri, vertex_count) {
                continue;
            }
            for &index in tri {
                let slot = &mut cursor[index as usize];
                flat[*slot as usize] = tri_index as u32;
                *slot += 1;
            }
        }

        VertexAdjacency {
            offsets,
            triangles: flat,
        }
    }

    /// Indices of the triangles referencing `vertex`.
    pub fn triangles_of(&self, vertex: usize) -> &[u32] {
        let start = self.offsets[vertex] as usize;
        let end = self.offsets[vertex + 1] as usize;
        &self.triangles[start..end]
    }
}

fn in_range(tri: &[u32; 3], vertex_count: usize) -> bool {
    tri.iter().all(|&i| (i as usize) < vertex_count)
}

/// Unit normal of triangle (A, B, C), or `None` when it has no area.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    let cross = (a - b).cross(c - b);
    let length_squared = cross.length_squared();
    if length_squared.is_finite() && length_squared > DEGENERATE_EPSILON {
        Some(cross / length_squared.sqrt())
    } else {
        None
    }
}

/// One normal per vertex, same order as `vertices`.
pub fn compute_normals(vertices: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let adjacency = VertexAdjacency::build(vertices.len(), triangles);

    let face_normals: Vec<Option<Vec3>> = triangles
        .iter()
        .map(|tri| {
            if !in_range(tri, vertices.len()) {
                return None;
            }
            let [a, b, c] = tri.map(|i| vertices[i as usize]);
            face_normal(a, b, c)
        })
        .collect();

    (0..vertices.len())
        .map(|vertex| {
            let sum: Vec3 = adjacency
                .triangles_of(vertex)
                .iter()
                .filter_map(|&tri| face_normals[tri as usize])
                .sum();
            sum.normalize_or_zero()
        })
        .collect()
}
