// Core module with fundamental types
pub mod core;

// Render module with meshing-related code
pub mod render;

// World module with generation and streaming
pub mod world;

pub mod constants;
pub mod error;
pub mod utils;

// Re-export commonly used items
pub use constants::*;
pub use crate::core::{AABB, ChunkRecord, ChunkStatus, GridCoord, MeshVertex};
pub use error::ConfigError;
pub use render::{ChunkMesh, MarchingTetrahedra, MeshSink, Polygonizer, RawMesh, compute_normals};
pub use utils::settings::{GenerationParameters, StreamingSettings, TerrainSettings};
pub use world::{
    ChunkGenerator, DensityField, GenerationWorker, NoiseBasis, StreamingManager, TerrainWorld,
    UpdateSummary, WorldStats,
};
