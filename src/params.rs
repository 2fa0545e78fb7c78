//! Live-tunable optical parameters of the dispersion material.
//!
//! [`DispersionParams`] is the panel's mutable store. The renderer never
//! reads it directly: each frame takes a [`DispersionParams::clamped`] copy
//! into the frame snapshot.

use std::ops::RangeInclusive;

use glam::Vec3;

use crate::util::{Error, Result};

/// Per-channel index of refraction range
pub const IOR_RANGE: RangeInclusive<f32> = 1.0..=2.333;
/// Saturation range
pub const SATURATION_RANGE: RangeInclusive<f32> = 1.0..=1.25;
/// Chromatic aberration strength range
pub const CHROMATIC_ABERRATION_RANGE: RangeInclusive<f32> = 0.0..=1.5;
/// Refraction strength range
pub const REFRACTION_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Declarative description of one scalar panel control.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Panel name (also the key for [`DispersionParams::get`]/[`DispersionParams::set`])
    pub name: &'static str,
    pub default: f32,
    /// `None` = unbounded
    pub range: Option<RangeInclusive<f32>>,
    pub step: Option<f32>,
    /// Collapsible group in the panel, if any
    pub folder: Option<&'static str>,
}

const fn unbounded(name: &'static str, default: f32) -> ParamSpec {
    ParamSpec {
        name,
        default,
        range: None,
        step: None,
        folder: None,
    }
}

const fn ior(name: &'static str, default: f32) -> ParamSpec {
    ParamSpec {
        name,
        default,
        range: Some(IOR_RANGE),
        step: Some(0.001),
        folder: Some("ior"),
    }
}

const fn ranged(name: &'static str, default: f32, range: RangeInclusive<f32>) -> ParamSpec {
    ParamSpec {
        name,
        default,
        range: Some(range),
        step: Some(0.01),
        folder: None,
    }
}

/// Scalar controls in panel order. The light vector is a separate vec3
/// control and is not listed here.
pub const PARAM_SPECS: &[ParamSpec] = &[
    unbounded("diffuseness", 0.2),
    unbounded("shininess", 40.0),
    unbounded("fresnelPower", 8.0),
    ior("iorR", 1.15),
    ior("iorY", 1.16),
    ior("iorG", 1.18),
    ior("iorC", 1.22),
    ior("iorB", 1.22),
    ior("iorP", 1.22),
    ranged("saturation", 1.08, SATURATION_RANGE),
    ranged("chromaticAberration", 0.6, CHROMATIC_ABERRATION_RANGE),
    ranged("refraction", 0.4, REFRACTION_RANGE),
];

/// Default light vector
pub const DEFAULT_LIGHT: Vec3 = Vec3::new(-1.0, 1.0, 1.0);

/// Optical parameters of the dispersion material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionParams {
    pub light: Vec3,
    pub diffuseness: f32,
    pub shininess: f32,
    pub fresnel_power: f32,
    pub ior_r: f32,
    pub ior_y: f32,
    pub ior_g: f32,
    pub ior_c: f32,
    pub ior_b: f32,
    pub ior_p: f32,
    pub saturation: f32,
    pub chromatic_aberration: f32,
    pub refraction: f32,
}

impl Default for DispersionParams {
    fn default() -> Self {
        let mut p = Self {
            light: DEFAULT_LIGHT,
            diffuseness: 0.0,
            shininess: 0.0,
            fresnel_power: 0.0,
            ior_r: 0.0,
            ior_y: 0.0,
            ior_g: 0.0,
            ior_c: 0.0,
            ior_b: 0.0,
            ior_p: 0.0,
            saturation: 0.0,
            chromatic_aberration: 0.0,
            refraction: 0.0,
        };
        for spec in PARAM_SPECS {
            if let Some(slot) = p.slot_mut(spec.name) {
                *slot = spec.default;
            }
        }
        p
    }
}

impl DispersionParams {
    /// The scalar control table
    pub fn specs() -> &'static [ParamSpec] {
        PARAM_SPECS
    }

    /// Look up a control by panel name
    pub fn spec(name: &str) -> Option<&'static ParamSpec> {
        PARAM_SPECS.iter().find(|s| s.name == name)
    }

    fn slot(&self, name: &str) -> Option<&f32> {
        Some(match name {
            "diffuseness" => &self.diffuseness,
            "shininess" => &self.shininess,
            "fresnelPower" => &self.fresnel_power,
            "iorR" => &self.ior_r,
            "iorY" => &self.ior_y,
            "iorG" => &self.ior_g,
            "iorC" => &self.ior_c,
            "iorB" => &self.ior_b,
            "iorP" => &self.ior_p,
            "saturation" => &self.saturation,
            "chromaticAberration" => &self.chromatic_aberration,
            "refraction" => &self.refraction,
            _ => return None,
        })
    }

    /// Mutable access to a scalar by panel name. Writes through this do
    /// not clamp; the panel widget or [`Self::clamped`] takes care of it.
    pub fn slot_mut(&mut self, name: &str) -> Option<&mut f32> {
        Some(match name {
            "diffuseness" => &mut self.diffuseness,
            "shininess" => &mut self.shininess,
            "fresnelPower" => &mut self.fresnel_power,
            "iorR" => &mut self.ior_r,
            "iorY" => &mut self.ior_y,
            "iorG" => &mut self.ior_g,
            "iorC" => &mut self.ior_c,
            "iorB" => &mut self.ior_b,
            "iorP" => &mut self.ior_p,
            "saturation" => &mut self.saturation,
            "chromaticAberration" => &mut self.chromatic_aberration,
            "refraction" => &mut self.refraction,
            _ => return None,
        })
    }

    /// Read a scalar by panel name
    pub fn get(&self, name: &str) -> Result<f32> {
        self.slot(name)
            .copied()
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    /// Set a scalar by panel name, clamped to its declared range.
    /// Returns the value actually stored.
    pub fn set(&mut self, name: &str, value: f32) -> Result<f32> {
        let spec = Self::spec(name).ok_or_else(|| Error::UnknownParameter(name.to_string()))?;
        let value = clamp_to(value, spec.range.as_ref());
        let slot = self
            .slot_mut(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))?;
        *slot = value;
        Ok(value)
    }

    /// Copy with every ranged scalar clamped to its declared range.
    /// Unbounded values (light, diffuseness, shininess, fresnelPower) pass through.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for spec in PARAM_SPECS {
            if let (Some(range), Some(slot)) = (spec.range.as_ref(), out.slot_mut(spec.name)) {
                *slot = clamp_to(*slot, Some(range));
            }
        }
        out
    }

    /// Restore every control to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Per-channel indices in R, Y, G, C, B, P order
    pub fn iors(&self) -> [f32; 6] {
        [self.ior_r, self.ior_y, self.ior_g, self.ior_c, self.ior_b, self.ior_p]
    }
}

fn clamp_to(value: f32, range: Option<&RangeInclusive<f32>>) -> f32 {
    match range {
        Some(r) if value.is_nan() => *r.start(),
        Some(r) => value.clamp(*r.start(), *r.end()),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_table() {
        let p = DispersionParams::default();
        for spec in DispersionParams::specs() {
            assert_eq!(p.get(spec.name).unwrap(), spec.default, "{}", spec.name);
        }
        assert_eq!(p.light, Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(p.iors(), [1.15, 1.16, 1.18, 1.22, 1.22, 1.22]);
    }

    #[test]
    fn test_set_clamps_to_declared_range() {
        let mut p = DispersionParams::default();
        assert_eq!(p.set("iorR", 3.0).unwrap(), 2.333);
        assert_eq!(p.set("iorR", 0.5).unwrap(), 1.0);
        assert_eq!(p.set("iorG", 1.5).unwrap(), 1.5);
        assert_eq!(p.set("chromaticAberration", 2.0).unwrap(), 1.5);
        assert_eq!(p.set("refraction", -0.1).unwrap(), 0.0);
        assert_eq!(p.set("saturation", 0.9).unwrap(), 1.0);
        assert_eq!(p.set("saturation", 1.3).unwrap(), 1.25);
    }

    #[test]
    fn test_unbounded_values_pass_through() {
        let mut p = DispersionParams::default();
        assert_eq!(p.set("shininess", 500.0).unwrap(), 500.0);
        assert_eq!(p.set("diffuseness", -2.0).unwrap(), -2.0);
        p.light = Vec3::new(10.0, -10.0, 0.0);
        let c = p.clamped();
        assert_eq!(c.shininess, 500.0);
        assert_eq!(c.diffuseness, -2.0);
        assert_eq!(c.light, Vec3::new(10.0, -10.0, 0.0));
    }

    #[test]
    fn test_clamped_fixes_raw_writes() {
        let mut p = DispersionParams::default();
        *p.slot_mut("iorP").unwrap() = 9.0;
        p.refraction = f32::NAN;
        let c = p.clamped();
        assert_eq!(c.ior_p, 2.333);
        assert_eq!(c.refraction, 0.0);
        // Source is untouched
        assert_eq!(p.ior_p, 9.0);
    }

    #[test]
    fn test_unknown_parameter() {
        let mut p = DispersionParams::default();
        assert!(matches!(p.set("iorX", 1.0), Err(Error::UnknownParameter(_))));
        assert!(p.get("light").is_err());
    }

    #[test]
    fn test_reset() {
        let mut p = DispersionParams::default();
        p.set("iorB", 2.0).unwrap();
        p.light = Vec3::ZERO;
        p.reset();
        assert_eq!(p, DispersionParams::default());
    }

    #[test]
    fn test_ior_folder() {
        let iors: Vec<_> = PARAM_SPECS
            .iter()
            .filter(|s| s.folder == Some("ior"))
            .map(|s| s.name)
            .collect();
        assert_eq!(iors, ["iorR", "iorY", "iorG", "iorC", "iorB", "iorP"]);
    }
}
