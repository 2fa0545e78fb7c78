//! Procedural star field.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Star field parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarFieldConfig {
    /// Inner radius of the star shell
    pub radius: f32,
    /// Shell thickness beyond `radius`
    pub depth: f32,
    pub count: usize,
    /// Size multiplier
    pub factor: f32,
    /// HSL saturation of star colors (0 = grey)
    pub saturation: f32,
    pub seed: u64,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            depth: 50.0,
            count: 5000,
            factor: 4.0,
            saturation: 0.0,
            seed: 0x5EED_57A2,
        }
    }
}

/// One generated star
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub size: f32,
    pub color: Vec3,
}

/// Generated star positions, sizes and colors
#[derive(Clone, Debug, PartialEq)]
pub struct StarField {
    pub config: StarFieldConfig,
    pub stars: Vec<Star>,
}

impl StarField {
    /// Generate the field. The same config (seed included) always yields
    /// the same stars.
    ///
    /// Stars are laid out from the outer edge inward: each one steps the
    /// shell radius down by a random fraction of `depth / count`, so radii
    /// stay within `[radius, radius + depth]`.
    pub fn generate(config: StarFieldConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut r = config.radius + config.depth;
        let increment = if config.count > 0 {
            config.depth / config.count as f32
        } else {
            0.0
        };

        let stars = (0..config.count)
            .map(|i| {
                r -= increment * rng.gen::<f32>();
                // Uniform on the sphere: cos(phi) uniform in [-1, 1]
                let phi = (1.0 - rng.gen::<f32>() * 2.0).acos();
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                let position = Vec3::new(
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                    r * phi.sin() * theta.cos(),
                );
                let hue = i as f32 / config.count as f32;
                let color = hsl_to_rgb(hue, config.saturation, 0.9);
                let size = (0.5 + 0.5 * rng.gen::<f32>()) * config.factor;
                Star {
                    position,
                    size,
                    color,
                }
            })
            .collect();

        Self { config, stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s <= 0.0 {
        return Vec3::splat(l);
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    Vec3::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_seed() {
        let cfg = StarFieldConfig {
            count: 200,
            ..Default::default()
        };
        assert_eq!(StarField::generate(cfg), StarField::generate(cfg));

        let other = StarField::generate(StarFieldConfig { seed: 7, ..cfg });
        assert_ne!(StarField::generate(cfg).stars, other.stars);
    }

    #[test]
    fn test_radii_within_shell() {
        let field = StarField::generate(StarFieldConfig::default());
        assert_eq!(field.len(), 5000);
        for star in &field.stars {
            let r = star.position.length();
            assert!(r >= 100.0 - 1e-3 && r <= 150.0 + 1e-3, "radius {}", r);
        }
    }

    #[test]
    fn test_sizes_and_grey_colors() {
        let field = StarField::generate(StarFieldConfig {
            count: 500,
            ..Default::default()
        });
        for star in &field.stars {
            assert!(star.size >= 2.0 && star.size <= 4.0);
            assert_eq!(star.color, Vec3::splat(0.9));
        }
    }

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        assert!((green - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_empty_field() {
        let field = StarField::generate(StarFieldConfig {
            count: 0,
            ..Default::default()
        });
        assert!(field.is_empty());
    }
}
