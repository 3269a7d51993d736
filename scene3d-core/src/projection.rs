/// Screen projections: perspective for depth-tested backends, fixed-scale
/// orthographic for the painter's path
use nalgebra::{Matrix4, Point2, Point3};

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn matrix(&self, aspect: f32) -> Matrix4<f32> {
        Matrix4::new_perspective(aspect, self.fov, self.near, self.far)
    }

    /// Project a camera-space point to screen space as `(x, y, depth)`.
    ///
    /// `pixel_aspect` is the width of one screen unit over its height.
    /// Points in front of the near plane are `None`; off-screen points are
    /// returned and left to the rasterizer's clipping.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        width: u32,
        height: u32,
        pixel_aspect: f32,
    ) -> Option<(f32, f32, f32)> {
        if -point.z < self.near {
            return None;
        }

        let aspect = width as f32 * pixel_aspect / height.max(1) as f32;
        let clip = self.matrix(aspect) * point.to_homogeneous();
        if clip.w.abs() < 1e-6 {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let depth = clip.z / clip.w;

        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, depth))
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            near: 0.1,
            far: 50.0,
        }
    }
}

/// Fixed-scale orthographic screen mapping: `screen = xy * scale + center`.
///
/// No perspective divide; y is flipped so +y is up on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoProjection {
    /// Screen units per world unit horizontally
    pub scale: f32,
    /// Width of one screen unit over its height, scales y
    pub pixel_aspect: f32,
}

impl OrthoProjection {
    pub fn to_screen(&self, point: &Point3<f32>, width: u32, height: u32) -> Point2<f32> {
        Point2::new(
            point.x * self.scale + width as f32 / 2.0,
            height as f32 / 2.0 - point.y * self.scale * self.pixel_aspect,
        )
    }
}

impl Default for OrthoProjection {
    fn default() -> Self {
        Self {
            scale: 100.0,
            pixel_aspect: 1.0,
        }
    }
}
