//! Scene configuration loading and validation
//!
//! Every section is optional in the TOML file; missing values fall back to
//! the stock scene (two letterforms, a glowing cube, bloom).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::pipeline::BloomParams;
use crate::state::{Point3, SceneState};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
    #[error("Invalid config: {0}")]
    ValidationError(String),
}

/// An sRGB color written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const WHITE: HexColor = HexColor([0xff, 0xff, 0xff]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Channels scaled to 0.0..=1.0 (still sRGB encoded)
    pub fn to_srgb_f32(self) -> [f32; 3] {
        self.0.map(|c| c as f32 / 255.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for HexColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#').trim_start_matches("0x");
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ConfigError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConfigError::InvalidColor(s.to_string()))
        };
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default = "default_glyphs", rename = "glyph")]
    pub glyphs: Vec<GlyphConfig>,
    #[serde(default)]
    pub cube: CubeConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub bloom: BloomParams,
    #[serde(default)]
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            font: FontConfig::default(),
            camera: CameraConfig::default(),
            glyphs: default_glyphs(),
            cube: CubeConfig::default(),
            lighting: LightingConfig::default(),
            bloom: BloomParams::default(),
            input: InputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// CSS selector of the canvas element in the browser
    #[serde(default = "default_canvas")]
    pub canvas: String,
    #[serde(default = "default_clear_color")]
    pub clear_color: HexColor,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            canvas: default_canvas(),
            clear_color: default_clear_color(),
        }
    }
}

impl WindowConfig {
    /// Element id named by an `#id` canvas selector
    pub fn canvas_id(&self) -> Option<&str> {
        self.canvas
            .strip_prefix('#')
            .filter(|id| !id.is_empty() && !id.contains(|c: char| c.is_whitespace() || ".#[:>".contains(c)))
    }
}

fn default_title() -> String {
    "Garda".to_string()
}

fn default_canvas() -> String {
    "#garda-canvas".to_string()
}

fn default_clear_color() -> HexColor {
    HexColor::rgb(0, 0, 0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Typeface JSON location (URL, or a file path on native builds)
    #[serde(default = "default_font_url")]
    pub url: String,
    /// Segments per flattened curve
    #[serde(default = "default_curve_segments")]
    pub curve_segments: usize,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            url: default_font_url(),
            curve_segments: default_curve_segments(),
        }
    }
}

pub const DEFAULT_FONT_URL: &str =
    "https://threejs.org/examples/fonts/helvetiker_regular.typeface.json";

fn default_font_url() -> String {
    DEFAULT_FONT_URL.to_string()
}

fn default_curve_segments() -> usize {
    crate::outline::DEFAULT_CURVE_SEGMENTS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            position: default_camera_position(),
        }
    }
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 0.0, 5.0]
}

/// One extruded text mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlyphConfig {
    pub text: String,
    #[serde(default = "default_text_size")]
    pub size: f32,
    #[serde(default = "default_text_depth")]
    pub depth: f32,
    #[serde(default)]
    pub position: [f32; 3],
    pub color: HexColor,
    #[serde(default = "default_half")]
    pub roughness: f32,
    #[serde(default = "default_half")]
    pub metalness: f32,
}

fn default_text_size() -> f32 {
    1.0
}

fn default_text_depth() -> f32 {
    0.2
}

fn default_half() -> f32 {
    0.5
}

fn default_glyphs() -> Vec<GlyphConfig> {
    vec![
        GlyphConfig {
            text: "A".to_string(),
            size: 1.0,
            depth: 0.2,
            position: [-2.0, 0.0, 0.0],
            color: HexColor::rgb(0xC3, 0xB0, 0x91), // khaki
            roughness: 0.5,
            metalness: 0.5,
        },
        GlyphConfig {
            text: "8".to_string(),
            size: 1.0,
            depth: 0.1,
            position: [1.0, 0.0, 0.0],
            color: HexColor::rgb(0x80, 0x00, 0x80), // purple
            roughness: 0.5,
            metalness: 0.5,
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeConfig {
    #[serde(default = "default_cube_size")]
    pub size: f32,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_cube_color")]
    pub color: HexColor,
    #[serde(default = "default_white")]
    pub emissive: HexColor,
    #[serde(default = "default_emissive_intensity")]
    pub emissive_intensity: f32,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: default_cube_size(),
            position: [0.0; 3],
            color: default_cube_color(),
            emissive: default_white(),
            emissive_intensity: default_emissive_intensity(),
        }
    }
}

fn default_cube_size() -> f32 {
    0.5
}

fn default_cube_color() -> HexColor {
    HexColor::rgb(0xff, 0, 0)
}

fn default_white() -> HexColor {
    HexColor::WHITE
}

fn default_emissive_intensity() -> f32 {
    5.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingConfig {
    #[serde(default = "default_white")]
    pub point_color: HexColor,
    /// Point light intensity in candela
    #[serde(default = "default_point_intensity")]
    pub point_intensity: f32,
    #[serde(default = "default_point_range")]
    pub point_range: f32,
    #[serde(default = "default_white")]
    pub ambient_color: HexColor,
    #[serde(default = "default_ambient_intensity")]
    pub ambient_intensity: f32,
    /// Multiplier from the intensities above to renderer light units
    #[serde(default = "default_unit_scale")]
    pub unit_scale: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            point_color: default_white(),
            point_intensity: default_point_intensity(),
            point_range: default_point_range(),
            ambient_color: default_white(),
            ambient_intensity: default_ambient_intensity(),
            unit_scale: default_unit_scale(),
        }
    }
}

impl LightingConfig {
    /// Point light luminous power for an isotropic source
    pub fn point_lumens(&self) -> f32 {
        self.point_intensity * 4.0 * std::f32::consts::PI * self.unit_scale
    }

    pub fn ambient_brightness(&self) -> f32 {
        self.ambient_intensity * self.unit_scale
    }
}

fn default_point_intensity() -> f32 {
    10.0
}

fn default_point_range() -> f32 {
    500.0
}

fn default_ambient_intensity() -> f32 {
    0.468
}

fn default_unit_scale() -> f32 {
    1000.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Distance moved per key event
    #[serde(default = "default_step")]
    pub step: f32,
    /// Apply OS key-repeat events (continuous movement while held)
    #[serde(default = "default_true")]
    pub key_repeat: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            key_repeat: true,
        }
    }
}

fn default_step() -> f32 {
    crate::state::MOVE_STEP
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::ValidationError(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(ConfigError::ValidationError(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        if self.window.canvas_id().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "window.canvas must be an id selector like \"#garda-canvas\", got \"{}\"",
                self.window.canvas
            )));
        }
        if self.font.url.trim().is_empty() {
            return Err(ConfigError::ValidationError("font.url is empty".to_string()));
        }
        if self.font.curve_segments == 0 {
            return Err(ConfigError::ValidationError(
                "font.curve_segments must be at least 1".to_string(),
            ));
        }
        if let Some(glyph) = self.glyphs.iter().find(|g| g.size <= 0.0 || g.depth < 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "glyph '{}' needs a positive size and non-negative depth",
                glyph.text
            )));
        }
        if self.cube.size <= 0.0 {
            return Err(ConfigError::ValidationError("cube.size must be positive".to_string()));
        }
        Ok(())
    }

    /// Initial shared scene state
    pub fn initial_state(&self) -> SceneState {
        SceneState::new(
            Point3::from(self.cube.position),
            Point3::from(self.camera.position),
            self.input.step,
        )
    }
}

/// Load configuration from file, falling back to defaults when absent
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = Config::from_toml(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Write the default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = Config::default().to_toml()?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stock_scene() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.camera.far, 1000.0);
        assert_eq!(config.camera.position, [0.0, 0.0, 5.0]);
        assert_eq!(config.font.url, DEFAULT_FONT_URL);
        assert_eq!(config.font.curve_segments, 12);

        assert_eq!(config.glyphs.len(), 2);
        assert_eq!(config.glyphs[0].text, "A");
        assert_eq!(config.glyphs[0].position[0], -2.0);
        assert_eq!(config.glyphs[0].depth, 0.2);
        assert_eq!(config.glyphs[1].text, "8");
        assert_eq!(config.glyphs[1].position[0], 1.0);
        assert_eq!(config.glyphs[1].depth, 0.1);
        assert_eq!(config.glyphs[1].color, HexColor::rgb(0x80, 0, 0x80));

        assert_eq!(config.cube.size, 0.5);
        assert_eq!(config.cube.emissive_intensity, 5.0);
        assert_eq!(config.lighting.point_intensity, 10.0);
        assert_eq!(config.lighting.point_range, 500.0);
        assert_eq!(config.lighting.ambient_intensity, 0.468);
        assert_eq!(config.bloom, BloomParams::default());
        assert_eq!(config.input.step, 0.1);
        assert!(config.input.key_repeat);
    }

    #[test]
    fn test_overrides() {
        let toml = r##"
[font]
url = "fonts/custom.typeface.json"

[input]
key_repeat = false

[bloom]
strength = 1.0
radius = 0.2
threshold = 0.5

[[glyph]]
text = "Z"
color = "#00ff00"
position = [0.5, 1.0, 0.0]
"##;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.font.url, "fonts/custom.typeface.json");
        assert!(!config.input.key_repeat);
        assert_eq!(config.bloom.threshold, 0.5);
        assert_eq!(config.glyphs.len(), 1);
        assert_eq!(config.glyphs[0].color, HexColor::rgb(0, 0xff, 0));
        assert_eq!(config.glyphs[0].size, 1.0);
        assert_eq!(config.glyphs[0].roughness, 0.5);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_toml("[camera]\nnear = 10.0\nfar = 1.0\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(Config::from_toml("[cube]\ncolor = \"red\"\n").is_err());
        assert!(matches!(
            Config::from_toml("[font]\ncurve_segments = 0\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            Config::from_toml("[window]\ncanvas = \".scene canvas\"\n"),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_canvas_id() {
        assert_eq!(Config::default().window.canvas_id(), Some("garda-canvas"));
        let config = Config::from_toml("[window]\ncanvas = \"#viewer\"\n").unwrap();
        assert_eq!(config.window.canvas_id(), Some("viewer"));
        for selector in ["garda-canvas", "#", "#a b", "#a.b"] {
            let window = WindowConfig {
                canvas: selector.to_string(),
                ..WindowConfig::default()
            };
            assert_eq!(window.canvas_id(), None, "{}", selector);
        }
    }

    #[test]
    fn test_hex_color() {
        let color: HexColor = "#C3B091".parse().unwrap();
        assert_eq!(color, HexColor::rgb(0xC3, 0xB0, 0x91));
        assert_eq!(color.to_string(), "#C3B091");
        assert_eq!(HexColor::WHITE.to_srgb_f32(), [1.0, 1.0, 1.0]);
        assert_eq!(HexColor::rgb(0, 0x33, 0xff).to_srgb_f32(), [0.0, 0.2, 1.0]);
        assert!("#12345".parse::<HexColor>().is_err());
        assert!("#GGGGGG".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_initial_state() {
        let state = Config::default().initial_state();
        assert_eq!(state.camera, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(state.light, state.cube);
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garda.toml");

        // Missing file falls back to defaults
        let config = load_config(&path).unwrap();
        assert_eq!(config.glyphs.len(), 2);

        save_default_config(&path).unwrap();
        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.glyphs[0].color, HexColor::rgb(0xC3, 0xB0, 0x91));
        assert_eq!(reloaded.lighting.unit_scale, 1000.0);
    }
}
