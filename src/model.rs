//! A skeleton together with the mesh it drives.

use cgmath::Rad;
use clap::ArgMatches;
use errors::Result;
use files;
use mesh::Mesh;
use skeleton::{build_skeleton, JointRecord, Skeleton};
use skinning;
use std::path::Path;

pub struct SkeletalModel {
    pub skeleton: Skeleton,
    pub mesh: Mesh,
}

impl SkeletalModel {
    pub fn from_arg_matches(matches: &ArgMatches) -> Result<SkeletalModel> {
        let path = |name: &str| Path::new(matches.value_of_os(name).unwrap());
        SkeletalModel::load(path("SKELETON"), path("MESH"), path("ATTACHMENTS"))
    }

    pub fn load(skeleton_path: &Path, mesh_path: &Path, attachments_path: &Path) -> Result<SkeletalModel> {
        let records = files::load_skeleton(skeleton_path)?;
        let mesh = files::load_mesh(mesh_path)?;
        let attachments = files::load_attachments(attachments_path, records.len())?;
        SkeletalModel::from_parts(&records, mesh, attachments)
    }

    /// Assemble a model and put it in its bind pose.
    pub fn from_parts(
        records: &[JointRecord],
        mut mesh: Mesh,
        attachments: Vec<Vec<f64>>,
    ) -> Result<SkeletalModel> {
        let mut skeleton = build_skeleton(records)?;
        mesh.set_attachments(attachments, skeleton.num_joints())?;
        check!(mesh.attachments.iter().all(|row| row.iter().all(|w| w.is_finite())))?;

        skeleton.compute_bind_world_to_joint_transforms();
        skeleton.update_current_joint_to_world_transforms();

        info!("loaded model with {} joints, {} vertices, {} triangles",
            skeleton.num_joints(), mesh.num_vertices(), mesh.faces.len());

        Ok(SkeletalModel { skeleton, mesh })
    }

    /// Set the Euler angles (applied as Rz Ry Rx) of one joint. Call
    /// `update` to see the effect on the mesh.
    pub fn set_joint_angles(&mut self, joint_idx: usize, rx: Rad<f64>, ry: Rad<f64>, rz: Rad<f64>) -> Result<()> {
        trace!("joint {} angles: {:?} {:?} {:?}", joint_idx, rx, ry, rz);
        self.skeleton.set_joint_angles(joint_idx, rx, ry, rz)
    }

    pub fn reset_pose(&mut self) {
        self.skeleton.reset_pose();
    }

    /// Propagate the current joint angles through the skeleton and re-skin
    /// the mesh.
    pub fn update(&mut self) {
        self.skeleton.update_current_joint_to_world_transforms();
        skinning::update_mesh(&self.skeleton, &mut self.mesh);
    }
}

#[cfg(test)]
use util::approx::point_approx_eq;
#[cfg(test)]
use cgmath::{Deg, Point3};

#[cfg(test)]
fn two_joint_model() -> SkeletalModel {
    let records = files::parse_skeleton("0 0 0 -1\n0 0 1 0\n").unwrap();
    let mesh = files::parse_mesh("v 0 0 1\n").unwrap();
    let attachments = files::parse_attachments("0 1\n", records.len()).unwrap();
    SkeletalModel::from_parts(&records, mesh, attachments).unwrap()
}

#[test]
fn test_rotating_root_swings_child_vertex() {
    let mut model = two_joint_model();
    assert!(point_approx_eq(model.mesh.current_vertices[0], Point3::new(0.0, 0.0, 1.0)));

    model.update();
    assert!(point_approx_eq(model.mesh.current_vertices[0], Point3::new(0.0, 0.0, 1.0)));

    model.set_joint_angles(0, Deg(90.0).into(), Rad(0.0), Rad(0.0)).unwrap();
    // Nothing moves until update
    assert!(point_approx_eq(model.mesh.current_vertices[0], Point3::new(0.0, 0.0, 1.0)));
    model.update();
    assert!(point_approx_eq(model.mesh.current_vertices[0], Point3::new(0.0, -1.0, 0.0)));

    model.reset_pose();
    model.update();
    assert!(point_approx_eq(model.mesh.current_vertices[0], Point3::new(0.0, 0.0, 1.0)));
}

#[test]
fn test_attachment_rows_must_match_vertices() {
    let records = files::parse_skeleton("0 0 0 -1\n").unwrap();
    let mesh = files::parse_mesh("v 0 0 0\nv 1 1 1\n").unwrap();
    let attachments = files::parse_attachments("1\n", 1).unwrap();
    assert!(SkeletalModel::from_parts(&records, mesh, attachments).is_err());
}

#[test]
fn test_short_row_does_not_misalign_later_rows() {
    let records = files::parse_skeleton("0 0 0 -1\n1 0 0 0\n").unwrap();
    let mesh = files::parse_mesh("v 1 0 0\nv 2 0 0\n").unwrap();
    let attachments = files::parse_attachments("1\n0 1\n", records.len()).unwrap();
    let mut model = SkeletalModel::from_parts(&records, mesh, attachments).unwrap();
    assert_eq!(model.mesh.attachments[1], vec![0.0, 1.0]);

    // Spin joint 1 half a turn about Y; only the second vertex follows it.
    model.set_joint_angles(1, Rad(0.0), Deg(180.0).into(), Rad(0.0)).unwrap();
    model.update();
    assert!(point_approx_eq(model.mesh.current_vertices[0], Point3::new(1.0, 0.0, 0.0)));
    assert!(point_approx_eq(model.mesh.current_vertices[1], Point3::new(0.0, 0.0, 0.0)));
}

#[test]
fn test_non_finite_weights_rejected() {
    use std::f64;

    let records = files::parse_skeleton("0 0 0 -1\n0 0 1 0\n").unwrap();
    let mesh = files::parse_mesh("v 0 0 1\n").unwrap();
    let attachments = files::parse_attachments("1 NaN\n", records.len()).unwrap();
    assert!(SkeletalModel::from_parts(&records, mesh.clone(), attachments).is_err());
    let attachments = vec![vec![0.5, f64::INFINITY]];
    assert!(SkeletalModel::from_parts(&records, mesh, attachments).is_err());
}
