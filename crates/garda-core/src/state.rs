//! Shared scene state, key mapping, and viewport math
//!
//! Every input and resize handler receives the same explicit state record
//! instead of capturing transforms individually.

use serde::{Deserialize, Serialize};

/// Distance moved per handled key event
pub const MOVE_STEP: f32 = 0.1;

/// A 3D position in scene units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const ZERO: Point3 = Point3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Point3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// A movement bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    CubeUp,
    CubeDown,
    CameraLeft,
    CameraRight,
}

impl KeyAction {
    /// Map a logical key value to an action. Matching is case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" => Some(Self::CubeUp),
            "s" => Some(Self::CubeDown),
            "a" => Some(Self::CameraLeft),
            "d" => Some(Self::CameraRight),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::CubeUp => "w",
            Self::CubeDown => "s",
            Self::CameraLeft => "a",
            Self::CameraRight => "d",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::CubeUp => "move cube up",
            Self::CubeDown => "move cube down",
            Self::CameraLeft => "move camera +x",
            Self::CameraRight => "move camera -x",
        }
    }

    pub const ALL: [KeyAction; 4] = [
        KeyAction::CubeUp,
        KeyAction::CubeDown,
        KeyAction::CameraLeft,
        KeyAction::CameraRight,
    ];
}

/// Mutable positions shared by the input handlers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub cube: Point3,
    pub camera: Point3,
    pub light: Point3,
    pub step: f32,
}

impl SceneState {
    pub fn new(cube: Point3, camera: Point3, step: f32) -> Self {
        Self {
            cube,
            camera,
            light: cube,
            step,
        }
    }

    /// Apply one key action; the point light then follows the cube.
    pub fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::CubeUp => self.cube.y += self.step,
            KeyAction::CubeDown => self.cube.y -= self.step,
            KeyAction::CameraLeft => self.camera.x += self.step,
            KeyAction::CameraRight => self.camera.x -= self.step,
        }
        self.light = self.cube;
    }

    /// Handle a raw key value, returning the action if one applied
    pub fn handle_key(&mut self, key: &str) -> Option<KeyAction> {
        let action = KeyAction::from_key(key)?;
        self.apply(action);
        Some(action)
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(Point3::ZERO, Point3::new(0.0, 0.0, 5.0), MOVE_STEP)
    }
}

/// Current drawing-surface size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub aspect: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        let mut viewport = Self {
            width: 0.0,
            height: 0.0,
            aspect: 1.0,
        };
        viewport.resize(width, height);
        viewport
    }

    /// Record new dimensions. A zero or invalid height keeps the previous aspect.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        if self.height > 0.0 && self.width.is_finite() && self.height.is_finite() {
            self.aspect = self.width / self.height;
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
