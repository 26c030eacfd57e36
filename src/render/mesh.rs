use glam::{DVec3, Vec3};

use crate::core::chunk::{ChunkRecord, GridCoord};
use crate::core::vertex::MeshVertex;

/// Finished chunk geometry, borrowed from the record for upload.
///
/// Vertices are chunk-local and already scaled to world units; place the
/// mesh at `world_origin`.
#[derive(Debug, Clone, Copy)]
pub struct ChunkMesh<'a> {
    pub coord: GridCoord,
    pub world_origin: DVec3,
    pub vertices: &'a [Vec3],
    pub triangles: &'a [[u32; 3]],
    pub normals: &'a [Vec3],
}

impl<'a> ChunkMesh<'a> {
    pub fn from_record(record: &'a ChunkRecord) -> Self {
        ChunkMesh {
            coord: record.coord,
            world_origin: record.world_origin,
            vertices: &record.vertices,
            triangles: &record.triangles,
            normals: &record.normals,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Position and normal interleaved per vertex, ready for a vertex buffer.
    pub fn interleaved(&self) -> Vec<MeshVertex> {
        self.vertices
            .iter()
            .zip(self.normals)
            .map(|(position, normal)| MeshVertex {
                position: position.to_array(),
                normal: normal.to_array(),
            })
            .collect()
    }

    /// Flat `u32` index buffer.
    pub fn indices(&self) -> &'a [u32] {
        bytemuck::cast_slice(self.triangles)
    }
}

/// Receives finished meshes and removals. Implemented by the rendering layer.
pub trait MeshSink {
    fn upload(&mut self, mesh: ChunkMesh<'_>);
    fn remove(&mut self, coord: GridCoord);
}
