use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::ConfigError;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TerrainSettings {
    pub generation: GenerationParameters,
    pub streaming: StreamingSettings,
}

impl TerrainSettings {
    /// Load and validate settings from a TOML file. Missing keys fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        tracing::info!("Loaded terrain settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: TerrainSettings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()?;
        self.streaming.validate()
    }
}

/// World generation parameters. Set once per world and never mutated afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationParameters {
    pub seed: f64,
    pub octaves: u32,
    pub surface_frequency: f64,
    pub cave_frequency: f64,
    pub noise_scale: f64,
    /// World-Z above which only the surface layer is used.
    pub surface_level: f64,
    /// World-Z below which only the cave layer is used. Must stay below `surface_level`.
    pub cave_level: f64,
    pub overall_noise_scale: f64,
    pub surface_noise_scale: f64,
    pub cave_noise_scale: f64,
    pub generate_caves: bool,
    /// Field space to world space multiplier.
    pub scale: f64,
    pub chunk_size: f64,
    pub chunk_height: f64,
    /// Polygonizer sampling step for the finest detail tier.
    pub cube_size: f64,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            octaves: DEFAULT_OCTAVES,
            surface_frequency: DEFAULT_SURFACE_FREQUENCY,
            cave_frequency: DEFAULT_CAVE_FREQUENCY,
            noise_scale: DEFAULT_NOISE_SCALE,
            surface_level: DEFAULT_SURFACE_LEVEL,
            cave_level: DEFAULT_CAVE_LEVEL,
            overall_noise_scale: DEFAULT_OVERALL_NOISE_SCALE,
            surface_noise_scale: DEFAULT_SURFACE_NOISE_SCALE,
            cave_noise_scale: DEFAULT_CAVE_NOISE_SCALE,
            generate_caves: true,
            scale: DEFAULT_SCALE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_height: DEFAULT_CHUNK_HEIGHT,
            cube_size: DEFAULT_CUBE_SIZE,
        }
    }
}

impl GenerationParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("noise_scale", self.noise_scale)?;
        positive("overall_noise_scale", self.overall_noise_scale)?;
        positive("surface_noise_scale", self.surface_noise_scale)?;
        positive("cave_noise_scale", self.cave_noise_scale)?;
        positive("scale", self.scale)?;
        positive("chunk_size", self.chunk_size)?;
        positive("chunk_height", self.chunk_height)?;
        positive("cube_size", self.cube_size)?;

        if !self.seed.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "seed",
                value: self.seed,
            });
        }
        // Also rejects NaN levels
        if !(self.cave_level < self.surface_level) {
            return Err(ConfigError::LevelOrdering {
                cave_level: self.cave_level,
                surface_level: self.surface_level,
            });
        }
        Ok(())
    }

    /// Width of one grid cell in world units.
    pub fn world_chunk_size(&self) -> f64 {
        self.chunk_size * self.scale
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StreamingSettings {
    /// Half-width, in grid cells, of the square kept resident around the observer.
    pub render_distance: i32,
    /// Retirement happens beyond `render_distance * chunk width * retire_slack`.
    pub retire_slack: f64,
    /// Sampling step multiplier for chunks outside the inner detail square.
    pub coarse_step_multiplier: f64,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            render_distance: DEFAULT_RENDER_DISTANCE,
            retire_slack: RETIRE_DISTANCE_SLACK,
            coarse_step_multiplier: COARSE_STEP_MULTIPLIER,
        }
    }
}

impl StreamingSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_distance < 1 {
            return Err(ConfigError::InvalidRenderDistance(self.render_distance));
        }
        positive("retire_slack", self.retire_slack)?;
        positive("coarse_step_multiplier", self.coarse_step_multiplier)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
