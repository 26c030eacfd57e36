//! Core data structures for terrain streaming
//! Contains chunk records, grid coordinates, bounds and upload vertices.

pub mod bounds;
pub mod chunk;
pub mod vertex;

// Re-export commonly used types
pub use bounds::AABB;
pub use chunk::{ChunkRecord, ChunkStatus, GridCoord};
pub use vertex::MeshVertex;
