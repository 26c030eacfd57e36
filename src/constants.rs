// Generation defaults
pub const DEFAULT_SEED: f64 = 69420.0;
pub const DEFAULT_OCTAVES: u32 = 10;
pub const DEFAULT_SURFACE_FREQUENCY: f64 = 0.35;
pub const DEFAULT_CAVE_FREQUENCY: f64 = 1.0;
pub const DEFAULT_NOISE_SCALE: f64 = 40.0;
pub const DEFAULT_SURFACE_LEVEL: f64 = 500.0;
pub const DEFAULT_CAVE_LEVEL: f64 = 400.0;
pub const DEFAULT_OVERALL_NOISE_SCALE: f64 = 16.0;
pub const DEFAULT_SURFACE_NOISE_SCALE: f64 = 12.0;
pub const DEFAULT_CAVE_NOISE_SCALE: f64 = 6.0;

// Chunk geometry (field-space units)
pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_CHUNK_SIZE: f64 = 256.0;
pub const DEFAULT_CHUNK_HEIGHT: f64 = 1000.0;
pub const DEFAULT_CUBE_SIZE: f64 = 24.0;

// Streaming
pub const DEFAULT_RENDER_DISTANCE: i32 = 18;
pub const RETIRE_DISTANCE_SLACK: f64 = 1.5;
pub const COARSE_STEP_MULTIPLIER: f64 = 2.0;

// fBm shape
pub const FBM_START_AMPLITUDE: f64 = 0.5;
pub const FBM_LACUNARITY: f64 = 2.0;
pub const FBM_GAIN: f64 = 0.5;

// Density blend offsets
pub const CAVE_FILL_BOOST: f64 = 0.2;
pub const SURFACE_FILL_BOOST: f64 = 0.1;
pub const CAVE_FLOOR_HEIGHT: f64 = 1.0;
pub const SOLID_DENSITY: f64 = 1.0;
pub const VOID_DENSITY: f64 = -1.0;

// Polygonizer
pub const ISO_VALUE: f64 = 0.0;
pub const MAX_SAMPLES_PER_CHUNK: usize = 16 * 1024 * 1024;
