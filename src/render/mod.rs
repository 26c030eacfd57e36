//! Mesh-side modules: surface extraction, normals and the upload interface.

pub mod mesh;
pub mod normals;
pub mod polygonizer;

// Re-export commonly used types
pub use mesh::{ChunkMesh, MeshSink};
pub use normals::compute_normals;
pub use polygonizer::{MarchingTetrahedra, Polygonizer, RawMesh};
