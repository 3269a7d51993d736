/// Scene contents: one camera, point lights and mesh instances
use nalgebra::{Point3, Vector3};

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::geometry::Mesh;
use crate::transform::{Pose, Transformable};

/// A point light. Its position is re-asserted to the backend every frame.
#[derive(Debug, Clone)]
pub struct PointLight {
    pose: Pose,
    /// RGBA diffuse color
    pub diffuse: [f32; 4],
}

impl PointLight {
    pub fn new(position: Point3<f32>, diffuse: [f32; 4]) -> Self {
        Self {
            pose: Pose::new(position, Vector3::zeros()),
            diffuse,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        self.pose.position
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Point3::new(10.0, 0.0, 10.0), [1.0, 1.0, 1.0, 1.0])
    }
}

impl Transformable for PointLight {
    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }
}

/// A loaded mesh placed in the scene
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub name: String,
    pub mesh: Mesh,
    pose: Pose,
}

impl MeshInstance {
    pub fn new(name: impl Into<String>, mesh: Mesh, pose: Pose) -> Self {
        Self {
            name: name.into(),
            mesh,
            pose,
        }
    }
}

impl Transformable for MeshInstance {
    fn pose(&self) -> &Pose {
        &self.pose
    }

    fn pose_mut(&mut self) -> &mut Pose {
        &mut self.pose
    }
}

/// Ordered entity collection: index 0 is the camera, then lights, then meshes.
///
/// Entities are never removed, so indices stay valid for the whole session.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<PointLight>,
    pub meshes: Vec<MeshInstance>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            lights: Vec::new(),
            meshes: Vec::new(),
        }
    }

    /// Scene with the configured camera and light and no meshes
    pub fn from_config(config: &EngineConfig) -> Self {
        let camera = Camera::from_kind(config.camera, config.camera_eye, config.camera_target);
        tracing::info!(
            camera = ?config.camera,
            eye = ?config.camera_eye,
            light = ?config.light_position,
            "building scene"
        );
        Self::new(camera).with_light(PointLight::new(config.light_position, config.light_diffuse))
    }

    pub fn with_light(mut self, light: PointLight) -> Self {
        self.lights.push(light);
        self
    }

    pub fn with_mesh(mut self, instance: MeshInstance) -> Self {
        tracing::debug!(
            name = %instance.name,
            faces = instance.mesh.face_count(),
            "added mesh to scene"
        );
        self.meshes.push(instance);
        self
    }

    /// Number of entities input can be aimed at
    pub fn entity_count(&self) -> usize {
        1 + self.lights.len() + self.meshes.len()
    }

    pub fn entity(&self, index: usize) -> Option<&dyn Transformable> {
        if index == 0 {
            return Some(&self.camera as &dyn Transformable);
        }
        let index = index - 1;
        match self.lights.get(index) {
            Some(light) => Some(light as &dyn Transformable),
            None => self
                .meshes
                .get(index - self.lights.len())
                .map(|m| m as &dyn Transformable),
        }
    }

    pub fn entity_mut(&mut self, index: usize) -> Option<&mut dyn Transformable> {
        if index == 0 {
            return Some(&mut self.camera as &mut dyn Transformable);
        }
        let index = index - 1;
        let light_count = self.lights.len();
        if index < light_count {
            return Some(&mut self.lights[index] as &mut dyn Transformable);
        }
        self.meshes
            .get_mut(index - light_count)
            .map(|m| m as &mut dyn Transformable)
    }

    /// All entities in index order
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut dyn Transformable> + '_ {
        std::iter::once(&mut self.camera as &mut dyn Transformable)
            .chain(self.lights.iter_mut().map(|l| l as &mut dyn Transformable))
            .chain(self.meshes.iter_mut().map(|m| m as &mut dyn Transformable))
    }

    /// Display name used by hosts to show the current target
    pub fn entity_name(&self, index: usize) -> Option<String> {
        let light_count = self.lights.len();
        match index {
            0 => Some("camera".to_string()),
            i if i <= light_count => Some(format!("light {}", i - 1)),
            i => self
                .meshes
                .get(i - 1 - light_count)
                .map(|m| format!("mesh {}", m.name)),
        }
    }
}
