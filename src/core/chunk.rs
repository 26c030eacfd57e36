use glam::{DVec3, Vec3};

use crate::core::bounds::AABB;
use crate::utils::settings::GenerationParameters;

/// Integer position of a chunk in the streaming grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Grid cell containing a world-space point (nearest cell centre).
    pub fn from_world(position: DVec3, params: &GenerationParameters) -> Self {
        let cell = params.world_chunk_size();
        Self {
            x: (position.x / cell).round() as i32,
            y: (position.y / cell).round() as i32,
        }
    }

    /// Chunk origin in field space (before `scale` is applied).
    pub fn field_origin(self, params: &GenerationParameters) -> DVec3 {
        DVec3::new(
            self.x as f64 * params.chunk_size,
            self.y as f64 * params.chunk_size,
            0.0,
        )
    }

    pub fn world_origin(self, params: &GenerationParameters) -> DVec3 {
        self.field_origin(params) * params.scale
    }

    /// Sampling volume for this chunk, centred horizontally on its origin.
    pub fn field_bounds(self, params: &GenerationParameters) -> AABB {
        let origin = self.field_origin(params);
        let half = params.chunk_size / 2.0;
        AABB::new(
            origin - DVec3::new(half, half, 0.0),
            origin + DVec3::new(half, half, params.chunk_height),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Pending,
    Generating,
    Ready,
    Retiring,
}

/// A streamed terrain chunk and the mesh buffers generated for it.
///
/// Buffers are only written by the generation worker while the record is
/// `Generating`, and only read by the control path once it is `Ready`.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub coord: GridCoord,
    pub world_origin: DVec3,
    /// Polygonizer step, in field units, chosen when the record was created.
    pub sampling_step: f64,
    pub status: ChunkStatus,
    /// Chunk-local positions (world units).
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub normals: Vec<Vec3>,
    /// Set once the mesh has been handed to the sink.
    pub uploaded: bool,
}

impl ChunkRecord {
    pub fn new(coord: GridCoord, sampling_step: f64, params: &GenerationParameters) -> Self {
        ChunkRecord {
            coord,
            world_origin: coord.world_origin(params),
            sampling_step,
            status: ChunkStatus::Pending,
            vertices: Vec::new(),
            triangles: Vec::new(),
            normals: Vec::new(),
            uploaded: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.triangles.is_empty()
    }

    /// Store freshly generated buffers and publish the record as `Ready`.
    pub fn set_mesh(&mut self, vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>, normals: Vec<Vec3>) {
        debug_assert_eq!(vertices.len(), normals.len());
        self.vertices = vertices;
        self.triangles = triangles;
        self.normals = normals;
        self.status = ChunkStatus::Ready;
    }

    /// Drop the owned buffers ahead of destruction.
    pub fn release(&mut self) {
        self.status = ChunkStatus::Retiring;
        self.vertices = Vec::new();
        self.triangles = Vec::new();
        self.normals = Vec::new();
    }
}
