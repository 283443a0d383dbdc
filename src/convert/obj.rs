//! Write a posed model as Wavefront OBJ.

use errors::Result;
use model::SkeletalModel;
use render::TriangleSoup;
use std::fmt::Write;

/// The skinned mesh goes in an object called "mesh". If `skeleton` is given
/// its triangles go in a second object called "skeleton".
pub fn write(s: &mut String, model: &SkeletalModel, skeleton: Option<&TriangleSoup>) -> Result<()> {
    let mesh = &model.mesh;

    writeln!(s, "# skelskin {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(s, "o mesh")?;
    for v in &mesh.current_vertices {
        writeln!(s, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for face in &mesh.faces {
        writeln!(s, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
    }

    if let Some(soup) = skeleton {
        // OBJ indices are global across objects
        let base = mesh.current_vertices.len() as u32 + 1;
        writeln!(s, "o skeleton")?;
        for v in &soup.positions {
            writeln!(s, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for tri in &soup.triangles {
            writeln!(s, "f {} {} {}", tri[0] + base, tri[1] + base, tri[2] + base)?;
        }
    }

    Ok(())
}

#[cfg(test)]
use files;
#[cfg(test)]
use cgmath::{Deg, Rad};
#[cfg(test)]
use render::{self, Sink};

#[test]
fn test_obj_reloads_as_posed_mesh() {
    let records = files::parse_skeleton("0 0 0 -1\n0 0 1 0\n").unwrap();
    let mesh = files::parse_mesh("v 0 0 1\nv 0 1 0\nv 1 0 0\nf 1 2 3\n").unwrap();
    let attachments = files::parse_attachments("0 1\n1\n1\n", 2).unwrap();
    let mut model = SkeletalModel::from_parts(&records, mesh, attachments).unwrap();
    model.set_joint_angles(0, Deg(90.0).into(), Rad(0.0), Rad(0.0)).unwrap();
    model.update();

    let mut s = String::new();
    write(&mut s, &model, None).unwrap();
    let reloaded = files::parse_mesh(&s).unwrap();
    assert_eq!(reloaded.faces, model.mesh.faces);
    assert_eq!(reloaded.bind_vertices.len(), 3);
    for (a, b) in reloaded.bind_vertices.iter().zip(model.mesh.current_vertices.iter()) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9 && (a.z - b.z).abs() < 1e-9);
    }

    // With the skeleton appended the face indices still point at real
    // vertices.
    let mut soup = TriangleSoup::new();
    render::draw_skeleton(&model.skeleton, ::cgmath::Matrix4::from_scale(1.0), &mut soup);
    soup.load_matrix(::cgmath::Matrix4::from_scale(1.0));
    s.clear();
    write(&mut s, &model, Some(&soup)).unwrap();
    let reloaded = files::parse_mesh(&s).unwrap();
    assert_eq!(reloaded.bind_vertices.len(), 3 + soup.positions.len());
    assert_eq!(reloaded.faces.len(), 1 + soup.triangles.len());
}
