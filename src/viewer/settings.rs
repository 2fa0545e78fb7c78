//! Persistent viewer settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::{Error, Result};

/// Window and camera state that persists between sessions.
///
/// Optical parameters are not stored; every session starts from the
/// material defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window
    pub window_width: f32,
    pub window_height: f32,
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,

    // UI layout
    pub side_panel_width: f32,

    // Camera orbit, unset until the first exit
    pub camera_distance: Option<f32>,
    pub camera_yaw: Option<f32>,
    pub camera_pitch: Option<f32>,

    // Last opened model
    pub last_model: Option<PathBuf>,

    // Display
    pub show_stars: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 800.0,
            window_x: None,
            window_y: None,
            side_panel_width: 260.0,
            camera_distance: None,
            camera_yaw: None,
            camera_pitch: None,
            last_model: None,
            show_stars: true,
        }
    }
}

impl Settings {
    /// Settings file path
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("dispersion");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the config dir, falling back to defaults
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Save settings to the config dir
    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("Failed to save settings: {}", e);
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self =
            serde_json::from_str(&text).map_err(|e| Error::Settings(e.to_string()))?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Settings(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !(self.window_width >= 200.0 && self.window_height >= 150.0) {
            self.window_width = defaults.window_width;
            self.window_height = defaults.window_height;
        }
        self.camera_distance = self.camera_distance.filter(|d| *d > 0.0);
        self.camera_pitch = self.camera_pitch.map(|p| p.clamp(-90.0, 90.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            window_width: 1600.0,
            window_x: Some(40.0),
            camera_distance: Some(12.5),
            camera_yaw: Some(30.0),
            camera_pitch: Some(-15.0),
            last_model: Some(PathBuf::from("models/head.glb")),
            show_stars: false,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_no_optical_parameters_stored() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        for name in ["ior", "chromatic", "saturation", "refraction", "fresnel", "shininess"] {
            assert!(!json.to_lowercase().contains(name), "{} leaked into settings", name);
        }
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "show_stars": false, "camera_distance": -1.0 }"#).unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert!(!settings.show_stars);
        assert_eq!(settings.camera_distance, None);
        assert_eq!(settings.camera_yaw, None);
        assert_eq!(settings.window_width, 1280.0);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(Error::Settings(_))));
    }
}
