//! Terrain density field
//!
//! Sign convention: positive density is solid, negative is empty, and the
//! surface sits at `ISO_VALUE` (0). The polygonizer treats samples strictly
//! above the isovalue as inside.
//!
//! The field blends a 2D surface layer (a vertical gradient perturbed by
//! surface fBm) with a 3D cave layer. Above `surface_level` only the surface
//! layer is used; between `cave_level` and `surface_level` the two are
//! interpolated on the untranslated Z coordinate.

use glam::DVec3;

use crate::constants::*;
use crate::error::ConfigError;
use crate::utils::settings::GenerationParameters;
use crate::world::noise::NoiseBasis;

/// The two noise layers evaluated at one point, before blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityLayers {
    pub surface: f64,
    pub cave: f64,
}

pub struct DensityField {
    params: GenerationParameters,
    noise: NoiseBasis,
    /// `1 / (surface_level - cave_level)`, validated non-zero at construction.
    inv_blend_span: f64,
}

impl DensityField {
    pub fn new(params: GenerationParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        let inv_blend_span = 1.0 / (params.surface_level - params.cave_level);
        Ok(DensityField {
            params,
            noise: NoiseBasis::new(),
            inv_blend_span,
        })
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    /// Density at a field-space point.
    pub fn sample(&self, point: DVec3) -> f64 {
        if self.params.generate_caves && point.z < CAVE_FLOOR_HEIGHT {
            // Solid floor so caves never breach the bottom of the world
            return SOLID_DENSITY;
        }
        if !self.params.generate_caves && point.z < self.params.cave_level {
            return VOID_DENSITY;
        }
        let layers = self.layers(point);
        self.blend(point.z, layers)
    }

    /// Evaluate the surface and cave layers at `point`.
    pub fn layers(&self, point: DVec3) -> DensityLayers {
        let p = &self.params;
        let noise_input = (point + DVec3::new(p.seed, p.seed, 0.0)) / p.noise_scale;

        let mut surface = 1.0 - noise_input.z / p.overall_noise_scale;
        let surface_input = DVec3::new(
            noise_input.x / p.surface_noise_scale,
            noise_input.y / p.surface_noise_scale,
            0.0,
        );
        surface += self
            .noise
            .fbm(surface_input, p.octaves, p.surface_frequency);

        let cave = self
            .noise
            .fbm(noise_input / p.cave_noise_scale, p.octaves, p.cave_frequency);

        DensityLayers { surface, cave }
    }

    /// Blend precomputed layers according to the height band `z` falls in.
    pub fn blend(&self, z: f64, layers: DensityLayers) -> f64 {
        let p = &self.params;

        if p.generate_caves {
            if z < CAVE_FLOOR_HEIGHT {
                SOLID_DENSITY
            } else if z >= p.surface_level {
                layers.surface
            } else if z < p.cave_level {
                layers.cave
            } else {
                // Boost caves slightly while blending to partially fill holes
                lerp(layers.cave + CAVE_FILL_BOOST, layers.surface, self.blend_factor(z))
            }
        } else if z >= p.surface_level {
            layers.surface
        } else if z < p.cave_level {
            VOID_DENSITY
        } else {
            lerp(layers.cave + SURFACE_FILL_BOOST, layers.surface, self.blend_factor(z))
        }
    }

    /// 0 at `cave_level`, 1 at `surface_level`.
    pub fn blend_factor(&self, z: f64) -> f64 {
        (z - self.params.cave_level) * self.inv_blend_span
    }
}

/// Exact at both ends: `t == 0` yields `a`, `t == 1` yields `b`.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(generate_caves: bool) -> DensityField {
        DensityField::new(GenerationParameters {
            generate_caves,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_blend_band() {
        let params = GenerationParameters {
            cave_level: 450.0,
            surface_level: 450.0,
            ..Default::default()
        };
        assert!(DensityField::new(params).is_err());
    }

    #[test]
    fn density_is_finite_everywhere() {
        for caves in [true, false] {
            let field = field(caves);
            for i in -20..20 {
                for z in [-50.0, 0.0, 0.5, 1.0, 399.9, 400.0, 450.0, 499.99, 500.0, 2000.0] {
                    let p = DVec3::new(i as f64 * 37.1, i as f64 * -11.3, z);
                    assert!(field.sample(p).is_finite(), "non-finite at {p:?}");
                }
            }
        }
    }

    #[test]
    fn surface_boundary_has_no_jump() {
        for caves in [true, false] {
            let field = field(caves);
            let layers = DensityLayers {
                surface: 0.37,
                cave: -0.61,
            };
            let surface_level = field.params().surface_level;
            assert_eq!(field.blend_factor(surface_level), 1.0);
            assert_eq!(field.blend(surface_level, layers), layers.surface);
            // Approaching from below converges on the same value
            let below = field.blend(surface_level - 1e-9, layers);
            assert!((below - layers.surface).abs() < 1e-9);
        }
    }

    #[test]
    fn cave_boundary_matches_boosted_cave_layer() {
        let field = field(true);
        let layers = DensityLayers {
            surface: 0.8,
            cave: 0.1,
        };
        let cave_level = field.params().cave_level;
        assert_eq!(field.blend_factor(cave_level), 0.0);
        assert_eq!(
            field.blend(cave_level, layers),
            layers.cave + CAVE_FILL_BOOST
        );
        assert_eq!(field.blend(cave_level - 1.0, layers), layers.cave);
    }

    #[test]
    fn caves_enabled_floor_is_solid() {
        let field = field(true);
        assert_eq!(field.sample(DVec3::new(10.0, 20.0, 0.0)), SOLID_DENSITY);
        assert_eq!(field.sample(DVec3::new(-5.0, 3.0, -100.0)), SOLID_DENSITY);
    }

    #[test]
    fn caves_disabled_is_void_below_cave_level() {
        let field = field(false);
        let cave_level = field.params().cave_level;
        assert_eq!(
            field.sample(DVec3::new(1.0, 2.0, cave_level - 0.5)),
            VOID_DENSITY
        );
        // The exact cave level is part of the blend band, not a special case
        let layers = field.layers(DVec3::new(1.0, 2.0, cave_level));
        assert_eq!(
            field.sample(DVec3::new(1.0, 2.0, cave_level)),
            layers.cave + SURFACE_FILL_BOOST
        );
    }

    #[test]
    fn above_surface_level_uses_surface_layer_only() {
        let field = field(true);
        let p = DVec3::new(123.0, 456.0, 800.0);
        assert_eq!(field.sample(p), field.layers(p).surface);
    }

    #[test]
    fn surface_layer_falls_with_height() {
        // The vertical gradient dominates over a large height span
        let field = field(true);
        let low = field.layers(DVec3::new(50.0, 50.0, 0.0)).surface;
        let high = field.layers(DVec3::new(50.0, 50.0, 5_000.0)).surface;
        assert!(high < low);
    }

    #[test]
    fn seed_translates_the_field() {
        let a = DensityField::new(GenerationParameters {
            seed: 0.0,
            ..Default::default()
        })
        .unwrap();
        let b = DensityField::new(GenerationParameters {
            seed: 100.0,
            ..Default::default()
        })
        .unwrap();
        let p = DVec3::new(5.0, 7.0, 900.0);
        assert_eq!(a.sample(p + DVec3::new(100.0, 100.0, 0.0)), b.sample(p));
    }

    #[test]
    fn field_is_shareable_across_threads() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<DensityField>();
    }
}
