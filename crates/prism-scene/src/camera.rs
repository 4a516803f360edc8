//! Viewer camera and first/third person layer mode

use crate::graph::Layers;
use glam::{Mat4, Vec3};
use prism_core::CameraConfig;

/// Which person's view the camera renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewLayerMode {
    FirstPerson,
    #[default]
    ThirdPerson,
}

impl ViewLayerMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::FirstPerson => "firstPerson",
            Self::ThirdPerson => "thirdPerson",
        }
    }
}

/// A perspective camera looking at a target
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Layers this camera renders
    pub layers: Layers,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            up: Vec3::Y,
            fov: config.fov,
            near: config.near,
            far: config.far,
            aspect: 16.0 / 9.0,
            layers: Layers::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    /// Enable the layer of `mode` and disable the other one
    pub fn apply_layer_mode(&mut self, mode: ViewLayerMode, first_person_only: u8, third_person_only: u8) {
        match mode {
            ViewLayerMode::FirstPerson => {
                self.layers.enable(first_person_only);
                self.layers.disable(third_person_only);
            }
            ViewLayerMode::ThirdPerson => {
                self.layers.disable(first_person_only);
                self.layers.enable(third_person_only);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mode_toggles_bits() {
        let mut camera = Camera::default();
        camera.apply_layer_mode(ViewLayerMode::FirstPerson, 9, 10);
        assert!(camera.layers.is_enabled(9));
        assert!(!camera.layers.is_enabled(10));
        assert!(camera.layers.is_enabled(0));

        camera.apply_layer_mode(ViewLayerMode::ThirdPerson, 9, 10);
        assert!(!camera.layers.is_enabled(9));
        assert!(camera.layers.is_enabled(10));
    }

    #[test]
    fn test_from_config() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(camera.fov, 30.0);
        let view = camera.view_matrix();
        // The target sits straight ahead on -Z in view space
        let p = view.transform_point3(camera.target);
        assert!(p.z < 0.0 && p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }
}
