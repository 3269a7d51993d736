/// Engine configuration with the defaults used by the shipped hosts
use nalgebra::Point3;

use crate::camera::CameraKind;
use crate::projection::OrthoProjection;

/// Which visibility strategy the renderer uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPath {
    /// Depth buffer when the backend has a depth test, painter's algorithm otherwise
    #[default]
    Auto,
    DepthBuffer,
    Painter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub camera: CameraKind,
    pub camera_eye: Point3<f32>,
    pub camera_target: Point3<f32>,
    pub light_position: Point3<f32>,
    pub light_diffuse: [f32; 4],
    pub render_path: RenderPath,
    pub ortho: OrthoProjection,
    /// Linear speed per frame while a movement key is held
    pub linear_step: f32,
    /// Angular speed per frame (radians) while a rotation key is held
    pub angular_step: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            camera: CameraKind::default(),
            camera_eye: Point3::new(0.0, 0.0, 5.0),
            camera_target: Point3::origin(),
            light_position: Point3::new(10.0, 0.0, 10.0),
            light_diffuse: [1.0, 1.0, 1.0, 1.0],
            render_path: RenderPath::default(),
            ortho: OrthoProjection::default(),
            linear_step: 0.01,
            angular_step: 1.0_f32.to_radians(),
        }
    }
}
