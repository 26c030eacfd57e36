//! Fractal noise sampling
//!
//! A single unseeded Perlin primitive is shared by every layer. Worlds differ
//! only by translating the sample point, never by reseeding the primitive.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use glam::DVec3;

use crate::constants::{FBM_GAIN, FBM_LACUNARITY, FBM_START_AMPLITUDE};

/// Fixed seed for the primitive so results are identical across runs.
const PRIMITIVE_SEED: i32 = 0;

pub struct NoiseBasis {
    primitive: FastNoiseLite,
}

impl NoiseBasis {
    pub fn new() -> Self {
        let mut primitive = FastNoiseLite::with_seed(PRIMITIVE_SEED);
        primitive.set_noise_type(Some(NoiseType::Perlin));
        // Frequency is applied per octave in `fbm`
        primitive.set_frequency(Some(1.0));
        NoiseBasis { primitive }
    }

    /// Coherent 3D noise in roughly [-1, 1]. Coordinates stay in `f64` so
    /// detail holds up far from the origin.
    pub fn noise3d(&self, point: DVec3) -> f64 {
        self.primitive.get_noise_3d(point.x, point.y, point.z) as f64
    }

    /// Fractal Brownian motion: `octaves` layers starting at amplitude 0.5,
    /// doubling frequency and halving amplitude each layer.
    pub fn fbm(&self, point: DVec3, octaves: u32, frequency: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = FBM_START_AMPLITUDE;
        let mut frequency = frequency;

        for _ in 0..octaves {
            total += amplitude * self.noise3d(point * frequency);
            frequency *= FBM_LACUNARITY;
            amplitude *= FBM_GAIN;
        }

        total
    }
}

impl Default for NoiseBasis {
    fn default() -> Self {
        Self::new()
    }
}
