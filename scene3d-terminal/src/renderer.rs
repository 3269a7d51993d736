/// ASCII rasterizer backend for terminal rendering
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use scene3d_core::{GraphicsBackend, Perspective};
use std::io::{self, Write};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 0.5;

/// Light reaching faces that no light faces
const AMBIENT: f32 = 0.15;

const LIGHT_MARKER: char = 'o';

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const BLANK: Cell = Cell {
    character: ' ',
    color: Color::Reset,
};

/// Rasterizes submitted geometry into a character grid and writes it out
pub struct AsciiRenderer<W: Write> {
    width: usize,
    height: usize,
    depth_test: bool,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    perspective: Perspective,
    view: Matrix4<f32>,
    transforms: Vec<Matrix4<f32>>,
    lights: Vec<(Point3<f32>, [f32; 4])>,
    out: W,
}

impl<W: Write> AsciiRenderer<W> {
    /// A renderer writing to `out`; without `depth_test` triangles are drawn
    /// in submission order
    pub fn new(width: usize, height: usize, depth_test: bool, out: W) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_test,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![BLANK; size],
            perspective: Perspective::default(),
            view: Matrix4::identity(),
            transforms: Vec::new(),
            lights: Vec::new(),
            out,
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(BLANK);
    }

    /// Character at a cell, for inspection
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x].character)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn model(&self) -> Matrix4<f32> {
        self.transforms.last().copied().unwrap_or_else(Matrix4::identity)
    }

    /// Flat shade: ambient plus diffuse from every enabled light
    fn shade(&self, normal: &Vector3<f32>, point: &Point3<f32>) -> Cell {
        let normal = normal.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        let mut rgb = [AMBIENT; 3];
        for (position, diffuse) in &self.lights {
            let Some(to_light) = (position - point).try_normalize(0.0) else {
                continue;
            };
            let lambert = normal.dot(&to_light).max(0.0);
            for (channel, intensity) in rgb.iter_mut().zip(diffuse) {
                *channel += lambert * intensity;
            }
        }
        let rgb = rgb.map(|c| c.min(1.0));
        let brightness = (rgb[0] + rgb[1] + rgb[2]) / 3.0;

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);

        Cell {
            character: LUMINOSITY_RAMP[char_index],
            color: Color::Rgb {
                r: (rgb[0] * 255.0) as u8,
                g: (rgb[1] * 255.0) as u8,
                b: (rgb[2] * 255.0) as u8,
            },
        }
    }

    fn project(&self, point: &Point3<f32>) -> Option<(f32, f32, f32)> {
        self.perspective.project_to_screen(
            point,
            self.width as u32,
            self.height as u32,
            CELL_ASPECT,
        )
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell, depth_tested: bool) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric(
                    (v0.0, v0.1),
                    (v1.0, v1.1),
                    (v2.0, v2.1),
                    (px, py),
                ) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let idx = y as usize * self.width + x as usize;
                if depth_tested {
                    let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                    if depth >= self.depth_buffer[idx] {
                        continue;
                    }
                    self.depth_buffer[idx] = depth;
                }
                self.cells[idx] = cell;
            }
        }
    }

    fn put_marker(&mut self, x: f32, y: f32, depth: Option<f32>) {
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return;
        }

        let idx = y as usize * self.width + x as usize;
        if let (true, Some(depth)) = (self.depth_test, depth) {
            self.depth_buffer[idx] = depth;
        }
        self.cells[idx] = Cell {
            character: LIGHT_MARKER,
            color: Color::Yellow,
        };
    }

    pub fn draw(&mut self) -> io::Result<()> {
        self.out.queue(MoveTo(0, 0))?;
        let mut color = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                if color != Some(cell.color) {
                    self.out.queue(SetForegroundColor(cell.color))?;
                    color = Some(cell.color);
                }
                self.out.queue(Print(cell.character))?;
            }
            if y + 1 < self.height {
                self.out.queue(Print("\r\n"))?;
            }
        }
        self.out.queue(ResetColor)?;
        Ok(())
    }
}

impl<W: Write> GraphicsBackend for AsciiRenderer<W> {
    fn has_depth_test(&self) -> bool {
        self.depth_test
    }

    fn viewport(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width as usize;
        self.height = height as usize;
        let size = self.width * self.height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.cells = vec![BLANK; size];
    }

    fn begin_frame(&mut self) {
        self.clear();
        self.transforms.clear();
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.draw()
    }

    fn set_view(&mut self, view: &Matrix4<f32>) {
        self.view = *view;
    }

    fn push_transform(&mut self, model: &Matrix4<f32>) {
        let combined = self.model() * model;
        self.transforms.push(combined);
    }

    fn pop_transform(&mut self) {
        self.transforms.pop();
    }

    fn draw_triangle(&mut self, normal: &Vector3<f32>, vertices: &[Point3<f32>; 3]) {
        let model = self.model();
        let model_view = self.view * model;

        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coords, vertex) in screen_coords.iter_mut().zip(vertices) {
            match self.project(&model_view.transform_point(vertex)) {
                Some(projected) => *coords = projected,
                None => return, // Triangle is clipped
            }
        }

        let [a, b, c] = vertices;
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        let cell = self.shade(
            &model.transform_vector(normal),
            &model.transform_point(&centroid),
        );
        self.rasterize_triangle(&screen_coords, cell, self.depth_test);
    }

    fn fill_polygon(&mut self, points: &[Point2<f32>], normal: &Vector3<f32>, centroid: &Point3<f32>) {
        let cell = self.shade(normal, centroid);
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        for pair in rest.windows(2) {
            let coords = [
                (first.x, first.y, 0.0),
                (pair[0].x, pair[0].y, 0.0),
                (pair[1].x, pair[1].y, 0.0),
            ];
            self.rasterize_triangle(&coords, cell, false);
        }
    }

    fn enable_light(&mut self, position: &Point3<f32>, diffuse: [f32; 4]) {
        self.lights.push((*position, diffuse));
    }

    fn disable_light(&mut self) {
        self.lights.pop();
    }

    fn draw_marker(&mut self, position: &Point3<f32>) {
        if let Some((x, y, depth)) = self.project(&self.view.transform_point(position)) {
            self.put_marker(x, y, Some(depth));
        }
    }

    fn draw_marker_screen(&mut self, point: &Point2<f32>) {
        self.put_marker(point.x, point.y, None);
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
