//! World generation and streaming modules
//! Contains the density field, chunk generation, the background worker and
//! the control path that keeps chunks around the observer.

pub mod density;
pub mod generator;
pub mod loader;
pub mod noise;
pub mod streaming;
pub mod terrain;

// Re-export commonly used types
pub use density::DensityField;
pub use generator::{ChunkBuffers, ChunkGenerator};
pub use loader::{ChunkStore, GenerationWorker, PassReport};
pub use noise::NoiseBasis;
pub use streaming::{StreamingManager, StreamingPlan};
pub use terrain::{TerrainWorld, UpdateSummary, WorldStats};
