//! Thread-safe chunk mesh generation
//!
//! Runs the polygonizer against the density field over one chunk's bounds
//! and turns the result into chunk-local buffers with smooth normals.

use glam::Vec3;

use crate::constants::ISO_VALUE;
use crate::core::chunk::GridCoord;
use crate::error::ConfigError;
use crate::render::normals::compute_normals;
use crate::render::polygonizer::{MarchingTetrahedra, Polygonizer};
use crate::utils::settings::GenerationParameters;
use crate::world::density::DensityField;

/// Buffers produced for one chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuffers {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub normals: Vec<Vec3>,
}

impl ChunkBuffers {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

pub struct ChunkGenerator {
    field: DensityField,
    polygonizer: Box<dyn Polygonizer>,
}

impl ChunkGenerator {
    pub fn new(params: GenerationParameters) -> Result<Self, ConfigError> {
        Self::with_polygonizer(params, Box::new(MarchingTetrahedra::default()))
    }

    pub fn with_polygonizer(
        params: GenerationParameters,
        polygonizer: Box<dyn Polygonizer>,
    ) -> Result<Self, ConfigError> {
        Ok(ChunkGenerator {
            field: DensityField::new(params)?,
            polygonizer,
        })
    }

    pub fn params(&self) -> &GenerationParameters {
        self.field.params()
    }

    pub fn field(&self) -> &DensityField {
        &self.field
    }

    /// Generate the mesh for `coord` at the given sampling step.
    ///
    /// Vertices come back relative to the chunk origin and multiplied by
    /// `scale`, so they can be placed directly at the chunk's world origin.
    pub fn generate_chunk(&self, coord: GridCoord, step: f64) -> ChunkBuffers {
        let params = self.field.params();
        let bounds = coord.field_bounds(params);
        let field = &self.field;
        let raw = self
            .polygonizer
            .polygonize(&|p| field.sample(p), bounds, step, ISO_VALUE);

        if raw.is_empty() {
            return ChunkBuffers::default();
        }

        let origin = coord.field_origin(params);
        let vertices: Vec<Vec3> = raw
            .vertices
            .iter()
            .map(|v| ((*v - origin) * params.scale).as_vec3())
            .collect();
        let normals = compute_normals(&vertices, &raw.triangles);

        ChunkBuffers {
            vertices,
            triangles: raw.triangles,
            normals,
        }
    }
}
