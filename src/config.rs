//! # Configuration
//!
//! Everything tunable about a room, loadable from JSON. Missing fields take
//! the defaults of the stock room (TV and computer stages).
//!
//! ```json
//! {
//!     "camera": { "eye": [6.0, 3.0, 10.0], "fov_degrees": 23.0 },
//!     "floor_offset": -1.5
//! }
//! ```

use std::fs;
use std::path::Path;

use cgmath::{Deg, Vector3};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoomError};
use crate::gfx::camera::{OrbitCamera, OrbitControls};
use crate::input::DEFAULT_DRAG_THRESHOLD;
use crate::navigation::{StageConfig, StageRegistry};
use crate::overlay::OverlayConfig;
use crate::shop;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            eye: [6.0, 3.0, 10.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 23.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraSettings {
    pub fn build(&self, aspect: f32) -> OrbitCamera {
        OrbitCamera::new(Vector3::from(self.eye), Vector3::from(self.target), aspect)
            .with_fov(Deg(self.fov_degrees))
            .with_clip_planes(self.near, self.far)
    }

    fn validate(&self) -> Result<()> {
        let finite = self
            .eye
            .iter()
            .chain(self.target.iter())
            .chain([self.fov_degrees, self.near, self.far].iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(RoomError::InvalidConfig("camera values must be finite".into()));
        }
        if self.fov_degrees <= 0.0 || self.fov_degrees >= 180.0 {
            return Err(RoomError::InvalidConfig(format!(
                "camera fov {} must be between 0 and 180 degrees",
                self.fov_degrees
            )));
        }
        if self.near <= 0.0 || self.far <= self.near {
            return Err(RoomError::InvalidConfig(
                "camera clip planes must satisfy 0 < near < far".into(),
            ));
        }
        Ok(())
    }
}

/// Orbit controls; `enabled: false` runs the room without user controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    pub enabled: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.01,
            min_distance: 0.05,
            max_distance: 50.0,
        }
    }
}

impl ControlsSettings {
    pub fn build(&self, target: Vector3<f32>) -> Option<OrbitControls> {
        if !self.enabled {
            return None;
        }
        let mut controls = OrbitControls::new(target);
        controls.damping_factor = self.damping_factor;
        controls.rotate_speed = self.rotate_speed;
        controls.zoom_speed = self.zoom_speed;
        controls.pan_speed = self.pan_speed;
        controls.bounds.min_distance = self.min_distance;
        controls.bounds.max_distance = self.max_distance;
        Some(controls)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(RoomError::InvalidConfig(
                "controls damping_factor must be within 0..=1".into(),
            ));
        }
        if !(self.min_distance > 0.0 && self.min_distance <= self.max_distance) {
            return Err(RoomError::InvalidConfig(
                "controls distance range must satisfy 0 < min <= max".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub camera: CameraSettings,
    pub controls: ControlsSettings,
    pub stages: Vec<StageConfig>,
    pub overlays: Vec<OverlayConfig>,
    pub shop_items: Vec<String>,
    pub drag_threshold: f32,
    pub floor_offset: f32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            controls: ControlsSettings::default(),
            stages: vec![StageConfig::tv(), StageConfig::computer()],
            overlays: vec![OverlayConfig::tv(), OverlayConfig::computer()],
            shop_items: shop::default_items(),
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            floor_offset: -1.5,
        }
    }
}

impl RoomConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        info!("[Config] loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.camera.validate()?;
        self.controls.validate()?;

        let registry = StageRegistry::new(self.stages.clone())?;
        for overlay in &self.overlays {
            overlay.validate()?;
            if registry.get(&overlay.stage).is_none() {
                return Err(RoomError::InvalidConfig(format!(
                    "overlay refers to unknown stage '{}'",
                    overlay.stage
                )));
            }
        }

        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            return Err(RoomError::InvalidConfig(
                "drag_threshold must be a non-negative number".into(),
            ));
        }
        if !self.floor_offset.is_finite() {
            return Err(RoomError::InvalidConfig("floor_offset must be finite".into()));
        }
        Ok(())
    }
}
