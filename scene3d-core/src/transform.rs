/// Poses, incremental movement and transformation matrices
use nalgebra::{Matrix4, Point3, Vector3};

/// Position, Euler angles (radians) and the velocities integrated each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub angle: Vector3<f32>,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
}

impl Pose {
    pub fn new(position: Point3<f32>, angle: Vector3<f32>) -> Self {
        Self {
            position,
            angle,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self::new(Point3::new(x, y, z), Vector3::zeros())
    }

    /// Add to each angle. No wraparound is applied.
    pub fn rotate(&mut self, delta: Vector3<f32>) {
        self.angle += delta;
    }

    /// Add to the position in world coordinates
    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn set_velocity(&mut self, linear: Vector3<f32>, angular: Vector3<f32>) {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::translation_matrix(self.position.coords) * Transform::rotation_matrix(&self.angle)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}

/// Anything in a scene that carries a [`Pose`]
pub trait Transformable {
    fn pose(&self) -> &Pose;

    fn pose_mut(&mut self) -> &mut Pose;

    fn rotate(&mut self, delta: Vector3<f32>) {
        self.pose_mut().rotate(delta);
    }

    /// Move by `delta` in the entity's own frame
    fn translate(&mut self, delta: Vector3<f32>) {
        self.pose_mut().translate(delta);
    }

    /// Integrate the current velocity once
    fn step(&mut self) {
        let Pose {
            linear_velocity,
            angular_velocity,
            ..
        } = *self.pose();
        self.rotate(angular_velocity);
        self.translate(linear_velocity);
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation about X, then Y, then Z in the entity's frame
    pub fn rotation_matrix(angle: &Vector3<f32>) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(angle.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, angle.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, angle.z));

        rx * ry * rz
    }

    pub fn translation_matrix(offset: Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(&offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(Pose);

    impl Transformable for Dummy {
        fn pose(&self) -> &Pose {
            &self.0
        }

        fn pose_mut(&mut self) -> &mut Pose {
            &mut self.0
        }
    }

    #[test]
    fn test_rotate_is_additive() {
        for (a, b) in [
            (Vector3::new(0.1, 0.2, 0.3), Vector3::new(-0.4, 1.5, 2.0)),
            (Vector3::new(90.0, 0.0, -45.0), Vector3::new(270.0, 360.0, 45.0)),
            (Vector3::new(1e3, -1e3, 0.0), Vector3::new(1e-3, 0.0, 7.0)),
        ] {
            let mut twice = Pose::default();
            twice.rotate(a);
            twice.rotate(b);

            let mut once = Pose::default();
            once.rotate(a + b);

            assert!((twice.angle - once.angle).norm() < 1e-3);
        }
    }

    #[test]
    fn test_angles_are_not_wrapped() {
        let mut pose = Pose::default();
        for _ in 0..10 {
            pose.rotate(Vector3::new(1.0, 0.0, 0.0));
        }
        assert!((pose.angle.x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_step_integrates_velocity() {
        let mut entity = Dummy(Pose::at(1.0, 2.0, 3.0));
        entity
            .pose_mut()
            .set_velocity(Vector3::new(0.5, 0.0, -1.0), Vector3::new(0.0, 0.1, 0.0));
        entity.step();
        entity.step();

        assert!((entity.pose().position - Point3::new(2.0, 2.0, 1.0)).norm() < 1e-6);
        assert!((entity.pose().angle - Vector3::new(0.0, 0.2, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_identity_rotation() {
        let matrix = Transform::rotation_matrix(&Vector3::zeros());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_model_matrix_rotates_then_translates() {
        let pose = Pose::new(
            Point3::new(0.0, 0.0, -5.0),
            Vector3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
        );
        let moved = pose.model_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((moved - Point3::new(0.0, 0.0, -6.0)).norm() < 1e-5);
    }
}
