/// Parser for the line-oriented `v` / `f` mesh text format
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map_res, opt},
    multi::many1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::MeshError;
use crate::geometry::{Mesh, Polygon};

/// Load a mesh from a file, streaming it line by line.
///
/// The mesh loads completely or not at all.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh, MeshError> {
    let path = path.as_ref();
    let file_error = |source| MeshError::File {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(file_error)?);
    let mut builder = MeshBuilder::default();
    for (index, line) in reader.lines().enumerate() {
        builder.push_line(index + 1, &line.map_err(file_error)?)?;
    }

    let mesh = builder.finish()?;
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Parse a mesh from in-memory text
pub fn parse_mesh(input: &str) -> Result<Mesh, MeshError> {
    let mut builder = MeshBuilder::default();
    for (index, line) in input.lines().enumerate() {
        builder.push_line(index + 1, line)?;
    }
    builder.finish()
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Point3<f32>>,
    polygons: Vec<Polygon>,
}

impl MeshBuilder {
    fn push_line(&mut self, number: usize, raw: &str) -> Result<(), MeshError> {
        let line = raw.split('#').next().unwrap_or_default().trim();

        match line.split_whitespace().next() {
            Some("v") => {
                let (_, (x, y, z)) = vertex_line(line)
                    .map_err(|_| MeshError::parse(number, format!("malformed vertex `{line}`")))?;
                self.vertices.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let (_, indices) = face_line(line)
                    .map_err(|_| MeshError::parse(number, format!("malformed face `{line}`")))?;
                let indices = indices
                    .into_iter()
                    .map(|i| {
                        i.checked_sub(1)
                            .ok_or_else(|| MeshError::parse(number, "face indices are 1-based"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.polygons.push(Polygon::at_line(indices, number));
            }
            // vn, vt, o, g, s, usemtl and blank lines carry nothing we draw
            _ => {}
        }

        Ok(())
    }

    fn finish(self) -> Result<Mesh, MeshError> {
        Mesh::from_polygons(self.vertices, self.polygons)
    }
}

fn vertex_line(input: &str) -> IResult<&str, (f32, f32, f32)> {
    all_consuming(terminated(
        preceded(
            tag("v"),
            tuple((
                preceded(space1, float),
                preceded(space1, float),
                preceded(space1, float),
            )),
        ),
        space0,
    ))(input)
}

fn face_line(input: &str) -> IResult<&str, Vec<usize>> {
    all_consuming(terminated(
        preceded(tag("f"), many1(preceded(space1, face_token))),
        space0,
    ))(input)
}

/// `12`, `12/4`, `12//7` or `12/4/7`: only the leading vertex index is kept
fn face_token(input: &str) -> IResult<&str, usize> {
    terminated(
        map_res(digit1, str::parse::<usize>),
        opt(pair(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use std::io::Write;

    #[test]
    fn test_single_quad_yields_two_unit_normals() {
        let mesh = parse_mesh(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 1 1 0\n\
             v 0 1 0\n\
             f 1 2 3 4\n",
        )
        .unwrap();

        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.normals.len(), 2);
        for normal in &mesh.normals {
            assert!((normal.norm() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_vertices_without_faces() {
        let mesh = parse_mesh("v 0 0 0\nv 1 2 3\nv -1.5 2e1 0.25\n").unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert!(mesh.faces.is_empty());
        assert!(mesh.normals.is_empty());
        assert_eq!(mesh.vertices[2], Point3::new(-1.5, 20.0, 0.25));
    }

    #[test]
    fn test_out_of_range_face_fails_load() {
        let err = parse_mesh("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 99\n").unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOutOfRange {
                line: 4,
                index: 99,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn test_slash_suffixes_are_ignored() {
        let mesh = parse_mesh(
            "v 0 0 0\n\
             v 1 0 0\n\
             v 0 1 0\n\
             vt 0 0\n\
             vn 0 0 1\n\
             f 1/1/1 2//1 3/1\n",
        )
        .unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert!((mesh.normals[0] - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_faces_may_precede_vertices() {
        let mesh = parse_mesh("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn test_comments_and_other_keywords_are_skipped() {
        let mesh = parse_mesh(
            "# a triangle\n\
             o tri\n\
             s off\n\
             \n\
             v 0 0 0 # origin\n\
             v 1 0 0\r\n\
             v 0 1 0\n\
             usemtl none\n\
             f 1 2 3\n",
        )
        .unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn test_malformed_lines_are_parse_errors() {
        for (source, bad_line) in [
            ("v 0 0\n", 1),
            ("v 0 0 zero\n", 1),
            ("v 0 0 0\nv 1 0 0 1\n", 2),
            ("v 0 0 0\nf 1 x 3\n", 2),
            ("v 0 0 0\nf\n", 2),
            ("v 0 0 0\nf 0 1 1\n", 2),
            ("v 0 0 0\nf -1 -2 -3\n", 2),
        ] {
            match parse_mesh(source) {
                Err(MeshError::Parse { line, .. }) => assert_eq!(line, bad_line, "{source:?}"),
                other => panic!("expected parse error for {source:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_load_mesh_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "v -1 -1 0").unwrap();
        writeln!(file, "v 1 -1 0").unwrap();
        writeln!(file, "v 1 1 0").unwrap();
        writeln!(file, "v -1 1 0").unwrap();
        writeln!(file, "f 1 2 3 4").unwrap();

        let mesh = load_mesh(file.path()).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_mesh(dir.path().join("missing.obj")).unwrap_err();
        assert!(matches!(err, MeshError::File { .. }));
    }
}
