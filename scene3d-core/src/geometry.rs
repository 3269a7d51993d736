/// Geometry primitives: meshes of flat-shaded triangles
use nalgebra::{Point3, Vector3};

use crate::error::MeshError;

/// A triangulated face as three zero-based indices into the mesh's vertex list
pub type Face = [usize; 3];

/// A polygon as it appears in a mesh source, before triangulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    pub indices: Vec<usize>,
    /// 1-based source line, 0 for procedurally built polygons
    pub line: usize,
}

impl Polygon {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices, line: 0 }
    }

    pub fn at_line(indices: Vec<usize>, line: usize) -> Self {
        Self { indices, line }
    }
}

/// A mesh of triangles with one flat normal per face
///
/// `normals[i]` belongs to `faces[i]`; every face index is valid for
/// `vertices`. Both hold for any mesh built through [`Mesh::from_polygons`].
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
    pub normals: Vec<Vector3<f32>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from raw vertices and 3- or 4-sided polygons.
    ///
    /// Quads are fan-split into `[v0, v1, v2]` and `[v0, v2, v3]`, which is
    /// only correct for convex planar quads.
    pub fn from_polygons(
        vertices: Vec<Point3<f32>>,
        polygons: impl IntoIterator<Item = Polygon>,
    ) -> Result<Self, MeshError> {
        let mut faces = Vec::new();

        for polygon in polygons {
            if let Some(&index) = polygon.indices.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    line: polygon.line,
                    // report the 1-based index as written in the source
                    index: index + 1,
                    vertex_count: vertices.len(),
                });
            }

            match polygon.indices[..] {
                [a, b, c] => faces.push([a, b, c]),
                [a, b, c, d] => {
                    faces.push([a, b, c]);
                    faces.push([a, c, d]);
                }
                _ => {
                    return Err(MeshError::parse(
                        polygon.line,
                        format!(
                            "face has {} vertices, expected 3 or 4",
                            polygon.indices.len()
                        ),
                    ))
                }
            }
        }

        let mut degenerate = 0usize;
        let normals = faces
            .iter()
            .map(|face| {
                face_normal(&vertices, face).unwrap_or_else(|| {
                    degenerate += 1;
                    Vector3::zeros()
                })
            })
            .collect();

        if degenerate > 0 {
            tracing::warn!(
                degenerate,
                faces = faces.len(),
                "mesh contains zero-area faces, using zero normals for them"
            );
        }

        Ok(Self {
            vertices,
            faces,
            normals,
        })
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Positions of a face's three corners
    pub fn face_vertices(&self, face: &Face) -> [Point3<f32>; 3] {
        face.map(|i| self.vertices[i])
    }

    /// Axis-aligned bounding box as `(min, max)`, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(v), max.sup(v))
        }))
    }

    /// Create a cube centred on the origin, built from six quads
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ];

        // Counter-clockwise when seen from outside
        let quads = [
            [4, 5, 6, 7], // front
            [0, 3, 2, 1], // back
            [0, 4, 7, 3], // left
            [1, 2, 6, 5], // right
            [3, 7, 6, 2], // top
            [0, 1, 5, 4], // bottom
        ];

        let faces: Vec<Face> = quads
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
            .collect();
        let normals = faces
            .iter()
            .map(|face| face_normal(&vertices, face).unwrap_or_else(Vector3::zeros))
            .collect();

        Self {
            vertices,
            faces,
            normals,
        }
    }
}

/// Flat normal of a triangle by the right-hand rule over its stored winding.
///
/// Returns `None` for zero-area triangles.
pub fn face_normal(vertices: &[Point3<f32>], face: &Face) -> Option<Vector3<f32>> {
    let v0 = vertices[face[0]];
    let v1 = vertices[face[1]];
    let v2 = vertices[face[2]];

    (v1 - v0).cross(&(v2 - v0)).try_normalize(0.0)
}
