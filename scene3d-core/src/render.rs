/// Scene rendering over an abstract graphics backend.
///
/// Two visibility strategies share one entry point, `Renderer::render`:
///
/// - **Depth buffer**: each mesh is submitted under its world transform and
///   the backend's depth test resolves visibility.
/// - **Painter's algorithm**: every face of every mesh in front of the eye is
///   brought into camera space, keyed by its minimum z and drawn farthest
///   first, so nearer faces overpaint farther ones. Interpenetrating or very
///   large faces can be misordered.
///
/// Lights are enabled before geometry and disabled after it on every frame;
/// the backend keeps no light state across frames.
use std::io;

use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::config::RenderPath;
use crate::geometry::Face;
use crate::projection::OrthoProjection;
use crate::scene::Scene;
use crate::transform::Transformable;

/// Contract with the graphics API that turns submissions into pixels
pub trait GraphicsBackend {
    /// Whether submissions through [`draw_triangle`](Self::draw_triangle) are depth tested
    fn has_depth_test(&self) -> bool;

    fn viewport(&self) -> (u32, u32);

    /// Match the viewport to a new host surface size
    fn resize(&mut self, width: u32, height: u32);

    fn begin_frame(&mut self);

    fn end_frame(&mut self) -> io::Result<()>;

    /// World-to-camera transform for the frame
    fn set_view(&mut self, view: &Matrix4<f32>);

    fn push_transform(&mut self, model: &Matrix4<f32>);

    fn pop_transform(&mut self);

    /// Object-space triangle under the current transform, with its flat normal
    fn draw_triangle(&mut self, normal: &Vector3<f32>, vertices: &[Point3<f32>; 3]);

    /// Screen-space polygon drawn over whatever is already there.
    /// `normal` and `centroid` are in world space, for lighting.
    fn fill_polygon(&mut self, points: &[Point2<f32>], normal: &Vector3<f32>, centroid: &Point3<f32>);

    /// World-space point light, valid until [`disable_light`](Self::disable_light)
    fn enable_light(&mut self, position: &Point3<f32>, diffuse: [f32; 4]);

    fn disable_light(&mut self);

    /// Small marker at a world-space position, drawn where a light sits
    fn draw_marker(&mut self, position: &Point3<f32>);

    /// Marker at an already projected screen point, for the painter path
    fn draw_marker_screen(&mut self, point: &Point2<f32>);
}

/// A face reference with its depth key for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthKeyed {
    pub mesh: usize,
    pub face: usize,
    pub depth: f32,
}

/// Minimum camera-space z over a face's vertices.
///
/// Recomputed every frame and never cached.
pub fn compute_depth_key(face: &Face, transformed: &[Point3<f32>]) -> f32 {
    face.iter()
        .map(|&i| transformed[i].z)
        .fold(f32::INFINITY, f32::min)
}

/// Ascending depth, farthest first for a camera looking down -Z.
/// The sort is stable: equal keys keep submission order.
pub fn sort_back_to_front(faces: &mut [DepthKeyed]) {
    faces.sort_by(|a, b| a.depth.total_cmp(&b.depth));
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Renderer {
    path: RenderPath,
    ortho: OrthoProjection,
}

impl Renderer {
    pub fn new(path: RenderPath, ortho: OrthoProjection) -> Self {
        Self { path, ortho }
    }

    /// The concrete path for a backend, resolving `Auto`
    pub fn active_path<B: GraphicsBackend + ?Sized>(&self, backend: &B) -> RenderPath {
        match self.path {
            RenderPath::Auto if backend.has_depth_test() => RenderPath::DepthBuffer,
            RenderPath::Auto => RenderPath::Painter,
            path => path,
        }
    }

    pub fn render<B: GraphicsBackend + ?Sized>(&self, scene: &Scene, backend: &mut B) -> io::Result<()> {
        backend.begin_frame();

        let view = scene.camera.view_matrix();
        backend.set_view(&view);

        let path = self.active_path(backend);
        let (width, height) = backend.viewport();
        for light in &scene.lights {
            let position = light.position();
            backend.enable_light(&position, light.diffuse);
            if path == RenderPath::Painter {
                let eye_space = view.transform_point(&position);
                if eye_space.z < 0.0 {
                    backend.draw_marker_screen(&self.ortho.to_screen(&eye_space, width, height));
                }
            } else {
                backend.draw_marker(&position);
            }
        }

        match path {
            RenderPath::Painter => self.draw_depth_sorted(scene, &view, backend),
            _ => draw_depth_buffered(scene, backend),
        }

        for _ in &scene.lights {
            backend.disable_light();
        }

        backend.end_frame()
    }

    fn draw_depth_sorted<B: GraphicsBackend + ?Sized>(
        &self,
        scene: &Scene,
        view: &Matrix4<f32>,
        backend: &mut B,
    ) {
        let models: Vec<Matrix4<f32>> = scene
            .meshes
            .iter()
            .map(|instance| instance.pose().model_matrix())
            .collect();

        let transformed: Vec<Vec<Point3<f32>>> = scene
            .meshes
            .iter()
            .zip(&models)
            .map(|(instance, model)| {
                let model_view = view * model;
                instance
                    .mesh
                    .vertices
                    .iter()
                    .map(|v| model_view.transform_point(v))
                    .collect()
            })
            .collect();

        let mut order: Vec<DepthKeyed> = scene
            .meshes
            .iter()
            .enumerate()
            .flat_map(|(mesh, instance)| {
                let transformed = &transformed[mesh];
                instance
                    .mesh
                    .faces
                    .iter()
                    .enumerate()
                    .map(move |(face, indices)| DepthKeyed {
                        mesh,
                        face,
                        depth: compute_depth_key(indices, transformed),
                    })
            })
            // Nothing at or behind the eye is painted
            .filter(|keyed| keyed.depth < 0.0)
            .collect();
        sort_back_to_front(&mut order);

        let (width, height) = backend.viewport();
        let mut points = Vec::with_capacity(3);
        for keyed in &order {
            let instance = &scene.meshes[keyed.mesh];
            let face = &instance.mesh.faces[keyed.face];
            let model = &models[keyed.mesh];

            points.clear();
            points.extend(
                face.iter()
                    .map(|&i| self.ortho.to_screen(&transformed[keyed.mesh][i], width, height)),
            );

            let [a, b, c] = instance.mesh.face_vertices(face);
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            let normal = model.transform_vector(&instance.mesh.normals[keyed.face]);
            backend.fill_polygon(&points, &normal, &model.transform_point(&centroid));
        }
    }
}

fn draw_depth_buffered<B: GraphicsBackend + ?Sized>(scene: &Scene, backend: &mut B) {
    for instance in &scene.meshes {
        backend.push_transform(&instance.pose().model_matrix());
        let mesh = &instance.mesh;
        for (face, normal) in mesh.faces.iter().zip(&mesh.normals) {
            backend.draw_triangle(normal, &mesh.face_vertices(face));
        }
        backend.pop_transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, CameraKind};
    use crate::geometry::Mesh;
    use crate::scene::{MeshInstance, PointLight};
    use crate::transform::Pose;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Begin,
        End,
        View,
        Push,
        Pop,
        Triangle,
        Fill(Vec<Point2<f32>>),
        EnableLight,
        DisableLight,
        Marker,
        ScreenMarker(Point2<f32>),
    }

    #[derive(Default)]
    struct RecordingBackend {
        depth_test: bool,
        calls: Vec<Call>,
    }

    impl GraphicsBackend for RecordingBackend {
        fn has_depth_test(&self) -> bool {
            self.depth_test
        }

        fn viewport(&self) -> (u32, u32) {
            (200, 100)
        }

        fn resize(&mut self, _width: u32, _height: u32) {}

        fn begin_frame(&mut self) {
            self.calls.push(Call::Begin);
        }

        fn end_frame(&mut self) -> io::Result<()> {
            self.calls.push(Call::End);
            Ok(())
        }

        fn set_view(&mut self, _view: &Matrix4<f32>) {
            self.calls.push(Call::View);
        }

        fn push_transform(&mut self, _model: &Matrix4<f32>) {
            self.calls.push(Call::Push);
        }

        fn pop_transform(&mut self) {
            self.calls.push(Call::Pop);
        }

        fn draw_triangle(&mut self, _normal: &Vector3<f32>, _vertices: &[Point3<f32>; 3]) {
            self.calls.push(Call::Triangle);
        }

        fn fill_polygon(&mut self, points: &[Point2<f32>], _normal: &Vector3<f32>, _centroid: &Point3<f32>) {
            self.calls.push(Call::Fill(points.to_vec()));
        }

        fn enable_light(&mut self, _position: &Point3<f32>, _diffuse: [f32; 4]) {
            self.calls.push(Call::EnableLight);
        }

        fn disable_light(&mut self) {
            self.calls.push(Call::DisableLight);
        }

        fn draw_marker(&mut self, _position: &Point3<f32>) {
            self.calls.push(Call::Marker);
        }

        fn draw_marker_screen(&mut self, point: &Point2<f32>) {
            self.calls.push(Call::ScreenMarker(*point));
        }
    }

    /// Camera at the origin looking down -Z
    fn scene() -> Scene {
        Scene::new(Camera::from_kind(
            CameraKind::LookAt,
            Point3::origin(),
            Point3::new(0.0, 0.0, -1.0),
        ))
        .with_light(PointLight::default())
    }

    fn facing_triangle() -> Mesh {
        crate::obj::parse_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap()
    }

    #[test]
    fn test_depth_key_is_minimum_z() {
        let transformed = [
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(0.0, 0.0, -4.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        assert_eq!(compute_depth_key(&[0, 1, 2], &transformed), -4.0);
        assert_eq!(compute_depth_key(&[0, 2, 2], &transformed), -1.0);
    }

    #[test]
    fn test_sort_is_ascending_and_stable() {
        let keyed = |face, depth| DepthKeyed { mesh: 0, face, depth };
        let mut faces = vec![
            keyed(0, -1.0),
            keyed(1, -10.0),
            keyed(2, -5.0),
            keyed(3, -10.0),
            keyed(4, 3.0),
        ];
        sort_back_to_front(&mut faces);
        let order: Vec<usize> = faces.iter().map(|f| f.face).collect();
        assert_eq!(order, vec![1, 3, 2, 0, 4]);
    }

    #[test]
    fn test_depth_buffer_path_submits_meshes_under_transform() {
        let scene = scene().with_mesh(MeshInstance::new("cube", Mesh::cube(1.0), Pose::at(0.0, 0.0, -5.0)));
        let mut backend = RecordingBackend {
            depth_test: true,
            ..Default::default()
        };

        let renderer = Renderer::default();
        assert_eq!(renderer.active_path(&backend), RenderPath::DepthBuffer);
        renderer.render(&scene, &mut backend).unwrap();

        let mut expected = vec![Call::Begin, Call::View, Call::EnableLight, Call::Marker, Call::Push];
        expected.extend(std::iter::repeat(Call::Triangle).take(12));
        expected.extend([Call::Pop, Call::DisableLight, Call::End]);
        assert_eq!(backend.calls, expected);
    }

    #[test]
    fn test_lights_are_reasserted_every_frame() {
        let scene = scene();
        let mut backend = RecordingBackend::default();
        let renderer = Renderer::default();
        renderer.render(&scene, &mut backend).unwrap();
        renderer.render(&scene, &mut backend).unwrap();

        let enables = backend.calls.iter().filter(|c| **c == Call::EnableLight).count();
        let disables = backend.calls.iter().filter(|c| **c == Call::DisableLight).count();
        assert_eq!((enables, disables), (2, 2));
    }

    #[test]
    fn test_painter_path_draws_far_mesh_first() {
        // The near mesh is submitted first but must be painted last
        let scene = scene()
            .with_mesh(MeshInstance::new("near", facing_triangle(), Pose::at(0.0, 0.0, -2.0)))
            .with_mesh(MeshInstance::new("far", facing_triangle(), Pose::at(0.5, 0.0, -20.0)));
        let mut backend = RecordingBackend::default();

        let renderer = Renderer::new(
            RenderPath::Auto,
            OrthoProjection {
                scale: 10.0,
                pixel_aspect: 1.0,
            },
        );
        assert_eq!(renderer.active_path(&backend), RenderPath::Painter);
        renderer.render(&scene, &mut backend).unwrap();

        let fills: Vec<&Vec<Point2<f32>>> = backend
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Fill(points) => Some(points),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 2);
        // Orthographic: x = x * scale + 100, y = 50 - y * scale
        assert_eq!(fills[0][0], Point2::new(105.0, 50.0));
        assert_eq!(fills[1][0], Point2::new(100.0, 50.0));
        assert_eq!(fills[1][2], Point2::new(100.0, 40.0));
        assert!(!backend.calls.contains(&Call::Push));
    }

    #[test]
    fn test_painter_path_skips_faces_behind_eye() {
        let scene = scene()
            .with_mesh(MeshInstance::new("behind", Mesh::cube(1.0), Pose::at(0.0, 0.0, 5.0)))
            .with_mesh(MeshInstance::new("ahead", facing_triangle(), Pose::at(0.0, 0.0, -5.0)));
        let mut backend = RecordingBackend::default();
        Renderer::new(RenderPath::Painter, OrthoProjection::default())
            .render(&scene, &mut backend)
            .unwrap();

        let fills = backend.calls.iter().filter(|c| matches!(c, Call::Fill(_))).count();
        assert_eq!(fills, 1);
    }

    #[test]
    fn test_painter_marker_uses_ortho_mapping() {
        let light = Point3::new(1.0, 0.0, -20.0);
        let ortho = OrthoProjection {
            scale: 10.0,
            pixel_aspect: 1.0,
        };
        let mut scene = scene();
        scene.lights[0] = PointLight::new(light, [1.0; 4]);
        let mut backend = RecordingBackend::default();
        Renderer::new(RenderPath::Painter, ortho)
            .render(&scene, &mut backend)
            .unwrap();

        // The camera sits at the origin, so camera space equals world space
        let expected = ortho.to_screen(&light, 200, 100);
        assert_eq!(expected, Point2::new(110.0, 50.0));
        assert!(backend.calls.contains(&Call::ScreenMarker(expected)));
        assert!(!backend.calls.contains(&Call::Marker));
    }

    #[test]
    fn test_painter_marker_hidden_behind_eye() {
        // Default light at (10, 0, 10) is behind a camera looking down -Z
        let mut backend = RecordingBackend::default();
        Renderer::new(RenderPath::Painter, OrthoProjection::default())
            .render(&scene(), &mut backend)
            .unwrap();
        assert!(!backend
            .calls
            .iter()
            .any(|c| matches!(c, Call::Marker | Call::ScreenMarker(_))));
    }

    #[test]
    fn test_forced_painter_path_ignores_depth_test() {
        let scene = scene().with_mesh(MeshInstance::new("cube", Mesh::cube(1.0), Pose::at(0.0, 0.0, -5.0)));
        let mut backend = RecordingBackend {
            depth_test: true,
            ..Default::default()
        };
        Renderer::new(RenderPath::Painter, OrthoProjection::default())
            .render(&scene, &mut backend)
            .unwrap();

        let fills = backend.calls.iter().filter(|c| matches!(c, Call::Fill(_))).count();
        assert_eq!(fills, 12);
        assert!(!backend.calls.contains(&Call::Triangle));
    }
}
