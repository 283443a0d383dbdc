//! Meshes are a subset of Wavefront OBJ:
//!
//!     v x y z
//!     f a b c
//!
//! Face indices are 1-based. Corners may be written `a/t/n`, in which case
//! only the position index is used, and faces with more than three corners
//! are split into a triangle fan. Anything else (normals, texcoords, groups,
//! ...) is skipped.

use cgmath::Point3;
use errors::{Result, ResultExt};
use mesh::Mesh;
use std::path::Path;
use super::{read_file, Fields};

static FILE_KIND: &str = "mesh";

pub fn load_mesh(path: &Path) -> Result<Mesh> {
    let text = read_file(path, FILE_KIND)?;
    parse_mesh(&text)
        .chain_err(|| format!("couldn't load mesh file {}", path.to_string_lossy()))
}

pub fn parse_mesh(text: &str) -> Result<Mesh> {
    let mut vertices = vec![];
    let mut faces = vec![];
    let mut num_skipped = 0;

    for (i, line) in text.lines().enumerate() {
        let mut fields = Fields::new(FILE_KIND, i + 1, line);
        let keyword = match fields.next_token() {
            Some(k) => k,
            None => continue,
        };
        if keyword.starts_with('#') {
            continue;
        }

        match keyword {
            "v" => {
                let x = fields.next::<f64>("vertex x")?;
                let y = fields.next::<f64>("vertex y")?;
                let z = fields.next::<f64>("vertex z")?;
                vertices.push(Point3::new(x, y, z));
                let extra = fields.remaining();
                if extra != 0 {
                    warn!("mesh line {}: ignoring {} field(s) after the vertex position",
                        i + 1, extra);
                }
            }
            "f" => {
                let mut corners = vec![];
                while let Some(token) = fields.next_token() {
                    let pos = token.split('/').next().unwrap_or(token);
                    let idx = fields.parse::<u32>(pos, "face index")?;
                    if idx == 0 {
                        return Err(fields.error(format!(
                            "face indices start at 1, found {}", idx,
                        )));
                    }
                    corners.push((idx - 1) as u32);
                }
                if corners.len() < 3 {
                    return Err(fields.error(format!(
                        "face needs at least 3 corners, found {}", corners.len(),
                    )));
                }
                for k in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {
                trace!("mesh line {}: skipping {:?}", i + 1, keyword);
                num_skipped += 1;
            }
        }
    }

    if num_skipped != 0 {
        debug!("skipped {} unsupported mesh line(s)", num_skipped);
    }
    debug!("read {} vertices, {} triangles", vertices.len(), faces.len());

    Mesh::new(vertices, faces)
}

#[test]
fn test_parse_mesh() {
    let text = "\
        # cube corner\n\
        v 0 0 0\n\
        v 1.0 0 0\n\
        vn 0 0 1\n\
        v 0 1 0\n\
        \n\
        f 1 2 3\n";
    let mesh = parse_mesh(text).unwrap();
    assert_eq!(mesh.bind_vertices, vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]);
    assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    assert_eq!(mesh.current_vertices, mesh.bind_vertices);
}

#[test]
fn test_parse_polygon_and_slashes() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1/1/1 2/2/1 3//1 4\n";
    let mesh = parse_mesh(text).unwrap();
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
}

#[test]
fn test_bad_faces() {
    use errors::ErrorKind;

    let err = parse_mesh("v 0 0 0\nf 0 1 1\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("mesh", 2, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }

    let err = parse_mesh("v 0 0 0\nf 1 1\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("mesh", 2, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }

    // Refers to a vertex that doesn't exist
    let err = parse_mesh("v 0 0 0\nf 1 1 2\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Mismatch(_) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }

    let err = parse_mesh("v 0 0 0\nf -1 1 1\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("mesh", 2, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }

    let err = parse_mesh("v 0 0\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("mesh", 1, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_face_index_too_big_for_u32() {
    use errors::ErrorKind;

    // 2^32 + 1 would wrap around to vertex 0 if it were truncated
    let err = parse_mesh("v 0 0 0\nf 4294967297 1 1\n").unwrap_err();
    match *err.kind() {
        ErrorKind::Parse("mesh", 2, _) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_extra_vertex_fields_ignored() {
    let mesh = parse_mesh("v 1 2 3 1.0\nv 4 5 6\nv 7 8 9\nf 1 2 3\n").unwrap();
    assert_eq!(mesh.bind_vertices[0], Point3::new(1.0, 2.0, 3.0));
    assert_eq!(mesh.num_vertices(), 3);
}
