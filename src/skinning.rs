//! Linear blend skinning.
//!
//! Every vertex is moved by the skinning equation
//!
//!     (vertex current pos) =
//!       ∑_{joint}
//!         (weight) (current joint-to-world) (bind world-to-joint) (vertex bind pos)
//!
//! ie. for each joint, undo the bind pose to get the vertex in that joint's
//! space, carry it along with the joint into the current pose, and average
//! the results by weight.
//!
//! The weights are used as-is. If a vertex's weights don't sum to one the
//! result is scaled and the homogeneous coordinate of the sum isn't one
//! either; it is dropped without dividing through.

use cgmath::{Matrix4, Point3, Vector4, Zero};
use mesh::Mesh;
use skeleton::Skeleton;

/// Weights at or below this count as zero.
pub static WEIGHT_EPSILON: f64 = 1e-5;

/// Recompute `mesh.current_vertices` from the skeleton's current pose.
pub fn update_mesh(skel: &Skeleton, mesh: &mut Mesh) {
    // (current joint-to-world) (bind world-to-joint) only depends on the
    // joint, so do those products once up front.
    let skinning_mats: Vec<Matrix4<f64>> = skel.tree.node_indices()
        .map(|node| {
            let joint = &skel.tree[node];
            joint.current_joint_to_world * joint.bind_world_to_joint
        })
        .collect();

    let Mesh { ref bind_vertices, ref attachments, ref mut current_vertices, .. } = *mesh;
    debug_assert_eq!(attachments.len(), bind_vertices.len());

    let rows = bind_vertices.iter().zip(attachments.iter());
    for (cur_pos, (bind_pos, weights)) in current_vertices.iter_mut().zip(rows) {
        let v = Vector4::new(bind_pos.x, bind_pos.y, bind_pos.z, 1.0);
        let mut acc = Vector4::zero();
        for (mat, &weight) in skinning_mats.iter().zip(weights.iter()) {
            if weight <= WEIGHT_EPSILON {
                continue;
            }
            acc += (*mat * v) * weight;
        }
        *cur_pos = Point3::new(acc.x, acc.y, acc.z);
    }
}

#[cfg(test)]
use util::approx::point_approx_eq;
#[cfg(test)]
use cgmath::{vec3, Deg, Rad};
#[cfg(test)]
use skeleton::{build_skeleton, JointRecord};

#[cfg(test)]
fn two_joints() -> Skeleton {
    let mut skel = build_skeleton(&[
        JointRecord { translation: vec3(0.0, 0.0, 0.0), parent: None },
        JointRecord { translation: vec3(0.0, 0.0, 1.0), parent: Some(0) },
    ]).unwrap();
    skel.compute_bind_world_to_joint_transforms();
    skel.update_current_joint_to_world_transforms();
    skel
}

#[cfg(test)]
fn mesh_with_weights(verts: Vec<Point3<f64>>, weights: Vec<Vec<f64>>) -> Mesh {
    let num_joints = weights[0].len();
    let mut mesh = Mesh::new(verts, vec![]).unwrap();
    mesh.set_attachments(weights, num_joints).unwrap();
    mesh
}

#[test]
fn test_identity_pose_round_trip() {
    let mut skel = build_skeleton(&[
        JointRecord { translation: vec3(0.3, 0.0, 0.0), parent: None },
        JointRecord { translation: vec3(0.0, 2.0, 0.0), parent: Some(0) },
        JointRecord { translation: vec3(1.0, 0.0, -1.0), parent: Some(1) },
    ]).unwrap();
    skel.compute_bind_world_to_joint_transforms();
    skel.update_current_joint_to_world_transforms();

    let verts = vec![
        Point3::new(1.0, 2.0, 3.0),
        Point3::new(-1.0, 0.5, 0.0),
        Point3::new(0.0, 0.0, 0.0),
    ];
    let mut mesh = mesh_with_weights(verts.clone(), vec![
        vec![1.0, 0.0, 0.0],
        vec![0.2, 0.3, 0.5],
        vec![0.0, 0.5, 0.5],
    ]);
    update_mesh(&skel, &mut mesh);
    for (&a, &b) in mesh.current_vertices.iter().zip(verts.iter()) {
        assert!(point_approx_eq(a, b));
    }
}

#[test]
fn test_parent_rotation_moves_child_vertex() {
    let mut skel = two_joints();
    let mut mesh = mesh_with_weights(
        vec![Point3::new(0.0, 0.0, 1.0)],
        vec![vec![0.0, 1.0]],
    );
    update_mesh(&skel, &mut mesh);
    assert!(point_approx_eq(mesh.current_vertices[0], Point3::new(0.0, 0.0, 1.0)));

    skel.set_joint_angles(0, Deg(90.0).into(), Rad(0.0), Rad(0.0)).unwrap();
    skel.update_current_joint_to_world_transforms();
    update_mesh(&skel, &mut mesh);
    assert!(point_approx_eq(mesh.current_vertices[0], Point3::new(0.0, -1.0, 0.0)));
}

#[test]
fn test_blend_between_joints() {
    let mut skel = two_joints();
    let mut mesh = mesh_with_weights(
        vec![Point3::new(1.0, 0.0, 1.0)],
        vec![vec![0.5, 0.5]],
    );
    // Rotating the child about its own origin moves the vertex half as much
    // as a rigid attachment would.
    skel.set_joint_angles(1, Rad(0.0), Rad(0.0), Deg(90.0).into()).unwrap();
    skel.update_current_joint_to_world_transforms();
    update_mesh(&skel, &mut mesh);
    assert!(point_approx_eq(mesh.current_vertices[0], Point3::new(0.5, 0.5, 1.0)));
}

#[test]
fn test_weights_are_not_renormalized() {
    let skel = two_joints();
    let mut mesh = mesh_with_weights(
        vec![Point3::new(2.0, 4.0, 6.0)],
        vec![vec![0.25, 0.25]],
    );
    update_mesh(&skel, &mut mesh);
    assert!(point_approx_eq(mesh.current_vertices[0], Point3::new(1.0, 2.0, 3.0)));
}

#[test]
fn test_tiny_weights_skipped() {
    let skel = two_joints();
    let mut mesh = mesh_with_weights(
        vec![Point3::new(1.0, 1.0, 1.0)],
        vec![vec![1.0, 0.00001]],
    );
    update_mesh(&skel, &mut mesh);
    assert!(point_approx_eq(mesh.current_vertices[0], Point3::new(1.0, 1.0, 1.0)));
}
