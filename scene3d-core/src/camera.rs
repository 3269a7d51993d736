/// Camera entity with two interchangeable view strategies
use nalgebra::{Matrix4, Point3, Vector3};

use crate::transform::{Pose, Transform, Transformable};

/// Which camera strategy a scene is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraKind {
    /// Look target fixed at construction, translation without panning
    AngleDriven,
    /// Explicit eye/center/up, movement along the camera's own basis
    #[default]
    LookAt,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraStrategy {
    AngleDriven {
        center: Point3<f32>,
    },
    LookAt {
        center: Point3<f32>,
        up: Vector3<f32>,
    },
}

/// A camera. The pose position is the eye point.
///
/// Rotation updates the stored angle only: neither strategy re-targets its
/// center from the angle after construction.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: Pose,
    strategy: CameraStrategy,
}

impl Camera {
    /// Angle-driven camera looking one unit along the direction its angle faces
    pub fn angle_driven(pose: Pose) -> Self {
        let center = pose.position + facing(&pose.angle);
        Self {
            pose,
            strategy: CameraStrategy::AngleDriven { center },
        }
    }

    pub fn look_at(eye: Point3<f32>, center: Point3<f32>, up: Vector3<f32>) -> Self {
        Self {
            pose: Pose::new(eye, Vector3::zeros()),
            strategy: CameraStrategy::LookAt { center, up },
        }
    }

    /// Build either strategy so that it initially looks from `eye` at `target`
    pub fn from_kind(kind: CameraKind, eye: Point3<f32>, target: Point3<f32>) -> Self {
        match kind {
            CameraKind::LookAt => Self::look_at(eye, target, Vector3::y()),
            CameraKind::AngleDriven => {
                let dir = (target - eye)
                    .try_normalize(0.0)
                    .unwrap_or(-Vector3::z());
                let angle = Vector3::new(dir.y.atan2(-dir.z), (-dir.x).asin(), 0.0);
                Self::angle_driven(Pose::new(eye, angle))
            }
        }
    }

    pub fn kind(&self) -> CameraKind {
        match self.strategy {
            CameraStrategy::AngleDriven { .. } => CameraKind::AngleDriven,
            CameraStrategy::LookAt { .. } => CameraKind::LookAt,
        }
    }

    pub fn strategy(&self) -> &CameraStrategy {
        &self.strategy
    }

    pub fn eye(&self) -> Point3<f32> {
        self.pose.position
    }

    pub fn center(&self) -> Point3<f32> {
        match self.strategy {
            CameraStrategy::AngleDriven { center } | CameraStrategy::LookAt { center, .. } => center,
        }
    }

    pub fn up(&self) -> Vector3<f32> {
        match self.strategy {
            CameraStrategy::AngleDriven { .. } => Vector3::y(),
            CameraStrategy::LookAt { up, .. } => up,
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        (self.center() - self.eye()).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(&self.up()).normalize()
    }

    /// World-to-camera transform from the `(right, up, -forward)` basis at the eye.
    ///
    /// Recomputed from eye, center and up on every call.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye(), &self.center(), &self.up())
    }
}

impl Transformable for Camera {
    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }

    /// Angle-driven: world-axis translation of eye and center together.
    /// Look-at: `delta.z` along forward, `delta.x` along right, `delta.y` along up.
    fn translate(&mut self, delta: Vector3<f32>) {
        let offset = match self.strategy {
            CameraStrategy::AngleDriven { .. } => delta,
            CameraStrategy::LookAt { center, up } => {
                // With the eye on the center only the up component is defined
                let forward = (center - self.pose.position)
                    .try_normalize(0.0)
                    .unwrap_or_else(Vector3::zeros);
                let right = forward
                    .cross(&up)
                    .try_normalize(0.0)
                    .unwrap_or_else(Vector3::zeros);
                forward * delta.z + right * delta.x + up * delta.y
            }
        };

        self.pose.position += offset;
        match &mut self.strategy {
            CameraStrategy::AngleDriven { center } | CameraStrategy::LookAt { center, .. } => {
                *center += offset
            }
        }
    }
}

/// Unit direction faced by a pose with the given angles; zero angles face -Z
fn facing(angle: &Vector3<f32>) -> Vector3<f32> {
    Transform::rotation_matrix(angle).transform_vector(&-Vector3::z())
}
