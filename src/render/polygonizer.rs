//! Implicit surface extraction
//!
//! `MarchingTetrahedra` samples the field on a regular lattice over the
//! bounds, splits each lattice cube into six tetrahedra around its main
//! diagonal and emits the isosurface crossing each tetrahedron. The split is
//! the same in every cube, so faces shared between cubes are cut the same way
//! and the output has no cracks.
//!
//! Samples strictly greater than the isovalue are inside. Output vertices are
//! shared between triangles (one per crossed lattice edge), and every
//! triangle (A, B, C) is wound so that `(A - B) x (C - B)` points out of the
//! solid, towards lower values.

use glam::DVec3;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::constants::MAX_SAMPLES_PER_CHUNK;
use crate::core::bounds::AABB;

/// Polygonizer output in the same space as the bounds.
#[derive(Debug, Clone, Default)]
pub struct RawMesh {
    pub vertices: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl RawMesh {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

pub trait Polygonizer: Send + Sync {
    fn polygonize(
        &self,
        field: &(dyn Fn(DVec3) -> f64 + Sync),
        bounds: AABB,
        step: f64,
        iso_value: f64,
    ) -> RawMesh;
}

// Cube corner offsets, indexed 0..8
const CUBE_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

// Six tetrahedra sharing the 0-6 diagonal
const CUBE_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

pub struct MarchingTetrahedra {
    /// Lattice size above which a request is refused instead of sampled.
    pub max_samples: usize,
}

impl Default for MarchingTetrahedra {
    fn default() -> Self {
        MarchingTetrahedra {
            max_samples: MAX_SAMPLES_PER_CHUNK,
        }
    }
}

impl Polygonizer for MarchingTetrahedra {
    fn polygonize(
        &self,
        field: &(dyn Fn(DVec3) -> f64 + Sync),
        bounds: AABB,
        step: f64,
        iso_value: f64,
    ) -> RawMesh {
        if !(step.is_finite() && step > 0.0) {
            tracing::warn!("Refusing to polygonize with step {}", step);
            return RawMesh::default();
        }

        let counts = bounds.sample_counts(step);
        let total = counts[0]
            .checked_mul(counts[1])
            .and_then(|n| n.checked_mul(counts[2]));
        match total {
            Some(total) if total <= self.max_samples => {}
            _ => {
                tracing::warn!(
                    "Lattice {:?} exceeds sample budget of {}, skipping",
                    counts,
                    self.max_samples
                );
                return RawMesh::default();
            }
        }
        if counts.iter().any(|&n| n < 2) {
            return RawMesh::default();
        }

        let grid = SampleGrid::sample(field, bounds, step, counts);
        let mut builder = MeshBuilder::new(&grid, iso_value);

        let [nx, ny, nz] = counts;
        for z in 0..nz - 1 {
            for y in 0..ny - 1 {
                for x in 0..nx - 1 {
                    let corners =
                        CUBE_CORNERS.map(|[dx, dy, dz]| grid.index(x + dx, y + dy, z + dz));
                    if builder.is_uniform(&corners) {
                        continue;
                    }
                    for tetrahedron in CUBE_TETRAHEDRA {
                        builder.march(tetrahedron.map(|c| corners[c]));
                    }
                }
            }
        }

        builder.finish()
    }
}

struct SampleGrid {
    bounds: AABB,
    step: f64,
    counts: [usize; 3],
    values: Vec<f64>,
}

impl SampleGrid {
    fn sample(
        field: &(dyn Fn(DVec3) -> f64 + Sync),
        bounds: AABB,
        step: f64,
        counts: [usize; 3],
    ) -> Self {
        let mut grid = SampleGrid {
            bounds,
            step,
            counts,
            values: Vec::new(),
        };
        let total = counts[0] * counts[1] * counts[2];
        grid.values = (0..total)
            .into_par_iter()
            .map(|i| field(grid.position(i)))
            .collect();
        grid
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.counts[0] * (y + self.counts[1] * z)
    }

    /// Lattice point position; the last row on each axis is clamped onto the bounds.
    fn position(&self, index: usize) -> DVec3 {
        let x = index % self.counts[0];
        let y = (index / self.counts[0]) % self.counts[1];
        let z = index / (self.counts[0] * self.counts[1]);
        let offset = DVec3::new(x as f64, y as f64, z as f64) * self.step;
        (self.bounds.min + offset).min(self.bounds.max)
    }
}

struct MeshBuilder<'a> {
    grid: &'a SampleGrid,
    iso_value: f64,
    vertices: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
    /// Lattice edge (sorted corner pair) to output vertex. A vertex lying
    /// exactly on a corner is keyed by `(corner, corner)`.
    edge_vertices: FxHashMap<(usize, usize), u32>,
}

impl<'a> MeshBuilder<'a> {
    fn new(grid: &'a SampleGrid, iso_value: f64) -> Self {
        MeshBuilder {
            grid,
            iso_value,
            vertices: Vec::new(),
            triangles: Vec::new(),
            edge_vertices: FxHashMap::default(),
        }
    }

    fn finish(self) -> RawMesh {
        RawMesh {
            vertices: self.vertices,
            triangles: self.triangles,
        }
    }

    fn inside(&self, corner: usize) -> bool {
        self.grid.values[corner] > self.iso_value
    }

    fn is_uniform(&self, corners: &[usize; 8]) -> bool {
        let first = self.inside(corners[0]);
        corners[1..].iter().all(|&c| self.inside(c) == first)
    }

    fn march(&mut self, tetrahedron: [usize; 4]) {
        let (inside, outside): (Vec<usize>, Vec<usize>) =
            tetrahedron.into_iter().partition(|&c| self.inside(c));

        match (inside.len(), outside.len()) {
            (1, 3) => {
                let lone = inside[0];
                let outward = self.centroid(&outside) - self.grid.position(lone);
                let tri = [
                    self.edge_vertex(lone, outside[0]),
                    self.edge_vertex(lone, outside[1]),
                    self.edge_vertex(lone, outside[2]),
                ];
                self.push_triangle(tri, outward);
            }
            (3, 1) => {
                let lone = outside[0];
                let outward = self.grid.position(lone) - self.centroid(&inside);
                let tri = [
                    self.edge_vertex(inside[0], lone),
                    self.edge_vertex(inside[1], lone),
                    self.edge_vertex(inside[2], lone),
                ];
                self.push_triangle(tri, outward);
            }
            (2, 2) => {
                let outward = self.centroid(&outside) - self.centroid(&inside);
                // Cyclic order around the quad
                let quad = [
                    self.edge_vertex(inside[0], outside[0]),
                    self.edge_vertex(inside[0], outside[1]),
                    self.edge_vertex(inside[1], outside[1]),
                    self.edge_vertex(inside[1], outside[0]),
                ];
                self.push_quad(quad, outward);
            }
            _ => {}
        }
    }

    fn centroid(&self, corners: &[usize]) -> DVec3 {
        let sum: DVec3 = corners.iter().map(|&c| self.grid.position(c)).sum();
        sum / corners.len() as f64
    }

    fn edge_vertex(&mut self, inside: usize, outside: usize) -> u32 {
        let v_in = self.grid.values[inside];
        let v_out = self.grid.values[outside];
        let mut t = (self.iso_value - v_in) / (v_out - v_in);
        if !t.is_finite() {
            t = 0.5;
        }

        let key = if t >= 1.0 {
            (outside, outside)
        } else if inside < outside {
            (inside, outside)
        } else {
            (outside, inside)
        };
        if let Some(&index) = self.edge_vertices.get(&key) {
            return index;
        }

        let p_in = self.grid.position(inside);
        let p_out = self.grid.position(outside);
        let position = p_in + (p_out - p_in) * t.clamp(0.0, 1.0);
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.edge_vertices.insert(key, index);
        index
    }

    fn push_triangle(&mut self, tri: [u32; 3], outward: DVec3) {
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
            return;
        }
        let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
        if (a - b).cross(c - b).dot(outward) < 0.0 {
            self.triangles.push([tri[2], tri[1], tri[0]]);
        } else {
            self.triangles.push(tri);
        }
    }

    fn push_quad(&mut self, quad: [u32; 4], outward: DVec3) {
        let [p0, p1, p2, p3] = quad.map(|i| self.vertices[i as usize]);
        // Diagonal cross product follows the counter-clockwise normal of the
        // cyclic order; the outward winding is its opposite.
        let ccw_normal = (p2 - p0).cross(p3 - p1);
        let quad = if ccw_normal.dot(outward) > 0.0 {
            [quad[0], quad[3], quad[2], quad[1]]
        } else {
            quad
        };
        for tri in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
            if tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2] {
                self.triangles.push(tri);
            }
        }
    }
}
