//! Renderer configuration.
//!
//! Settings are read from `lumen.toml` and may be overridden by
//! environment variables. Every section falls back to its defaults, so a
//! partial file (or none at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File looked up by [`LumenConfig::load_or_default`].
pub const DEFAULT_CONFIG_FILE: &str = "lumen.toml";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LumenConfig {
    /// Back buffer size
    pub window: WindowConfig,
    /// Shadow map settings
    pub shadow: ShadowConfig,
    /// Shader source location
    pub shaders: ShaderConfig,
    /// Runtime feature toggles
    pub features: FeatureConfig,
    /// Light intensities
    pub lighting: LightingConfig,
    /// Camera projection
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Edge length of the square shadow map
    pub map_size: u32,
    /// Polygon offset factor applied during the depth pre-pass
    pub depth_bias_scale: f32,
    /// Polygon offset units applied during the depth pre-pass
    pub depth_unit_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Directory holding the `*.vert` / `*.frag` sources
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub direct_light: bool,
    pub point_light: bool,
    pub shadow_mapping: bool,
    pub bump_mapping: bool,
    pub tone_mapping: bool,
    pub taa: bool,
    pub taa_jitter: bool,
    /// Run the transparency pass over the bounding-box models
    pub draw_aabbs: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_flux: f32,
    pub direct_flux: f32,
    pub point_flux: f32,
    pub bump_map_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            depth_bias_scale: 0.1,
            depth_unit_scale: 1.0,
        }
    }
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("shaders"),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            direct_light: true,
            point_light: true,
            shadow_mapping: true,
            bump_mapping: true,
            tone_mapping: true,
            taa: true,
            taa_jitter: true,
            draw_aabbs: false,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_flux: 0.5,
            direct_flux: 1.5,
            point_flux: 2.5,
            bump_map_scale: 0.00001,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: 1.0472,
            near: 0.1,
            far: 10000.0,
        }
    }
}

impl LumenConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Toml`]
    /// if it is not valid TOML for this structure.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `lumen.toml` from the current directory, or return defaults if
    /// it is missing or invalid.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(DEFAULT_CONFIG_FILE) {
            Ok(config) => config,
            Err(Error::Io(_)) => Self::default(),
            Err(err) => {
                tracing::warn!("Ignoring {}: {}", DEFAULT_CONFIG_FILE, err);
                Self::default()
            }
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Environment variables take precedence over file values. Unparsable
    /// values are ignored.
    pub fn merge_with_env(&mut self) {
        if let Some(width) = env_parse("LUMEN_WIDTH") {
            self.window.width = width;
        }
        if let Some(height) = env_parse("LUMEN_HEIGHT") {
            self.window.height = height;
        }
        if let Some(size) = env_parse("LUMEN_SHADOW_MAP_SIZE") {
            self.shadow.map_size = size;
        }
        if let Ok(dir) = std::env::var("LUMEN_SHADER_DIR") {
            self.shaders.directory = PathBuf::from(dir);
        }
        if let Ok(val) = std::env::var("LUMEN_TAA") {
            self.features.taa = val == "1" || val.eq_ignore_ascii_case("true");
        }
    }

    /// Reject values no pipeline can be built with.
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.shadow.map_size == 0 {
            return Err(Error::Config("shadow map size must be non-zero".into()));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(Error::Config(format!(
                "invalid clip planes near={} far={}",
                self.camera.near, self.camera.far
            )));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}
