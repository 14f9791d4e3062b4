//! Render configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Missing fields fall back to the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::rasterizer::{Color, Lighting, LineAlgorithm, ShadingMode, Transforms, Vec3};

/// Error type for config loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Everything one render pass needs besides the models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub camera: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Direction the light travels
    pub light_dir: Vec3,
    pub ambient: f32,
    pub shininess: f32,
    pub shading: ShadingMode,
    /// Draw face edges over the shaded image
    pub wireframe: Option<LineAlgorithm>,
    pub wireframe_color: Color,
    /// Clear the depth buffer before each model instead of once per run
    pub reset_depth_per_model: bool,
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 2000,
            camera: Vec3::new(0.25, 0.3, 2.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            light_dir: Vec3::new(0.3, -0.7, -1.0),
            ambient: 0.1,
            shininess: 64.0,
            shading: ShadingMode::BlinnPhong,
            wireframe: None,
            wireframe_color: Color::WHITE,
            reset_depth_per_model: false,
            output: PathBuf::from("output.tga"),
        }
    }
}

impl RenderConfig {
    /// Direction the camera looks
    pub fn view_dir(&self) -> Vec3 {
        self.target - self.camera
    }

    pub fn transforms(&self) -> Transforms {
        Transforms::look_at(self.width, self.height, self.camera, self.target, self.up)
    }

    pub fn lighting(&self) -> Lighting {
        Lighting::new(self.light_dir, self.view_dir(), self.ambient, self.shininess)
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RenderConfig::default();
        assert_eq!((cfg.width, cfg.height), (2000, 2000));
        assert_eq!(cfg.shading, ShadingMode::BlinnPhong);
        assert_eq!(cfg.view_dir(), Vec3::new(-0.25, -0.3, -2.0));
        assert!((cfg.lighting().light_dir.len() - 1.0).abs() < 1e-5);
        assert!(!cfg.reset_depth_per_model);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg = load_config_from_str("(width: 64, height: 32, shading: Toon, wireframe: Some(Parametric))").unwrap();
        assert_eq!((cfg.width, cfg.height), (64, 32));
        assert_eq!(cfg.shading, ShadingMode::Toon);
        assert_eq!(cfg.wireframe, Some(LineAlgorithm::Parametric));
        assert_eq!(cfg.ambient, 0.1);
        assert_eq!(cfg.output, PathBuf::from("output.tga"));
    }

    #[test]
    fn test_bad_config_is_parse_error() {
        let err = load_config_from_str("(width: \"wide\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.ron");

        let cfg = RenderConfig {
            width: 320,
            height: 240,
            shading: ShadingMode::Phong,
            camera: Vec3::new(1.0, 2.0, 3.0),
            reset_depth_per_model: true,
            ..RenderConfig::default()
        };
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
