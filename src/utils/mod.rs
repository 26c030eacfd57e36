pub mod settings;

pub use settings::{GenerationParameters, StreamingSettings, TerrainSettings};
