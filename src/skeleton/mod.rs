//! Joint hierarchy for a skinned mesh.
//!
//! The skeleton is a tree of joints. Each joint has a local-to-parent
//! transform; composing it with its parent's, and so on up to the root, gives
//! the joint's joint-to-world transform. Example:
//!
//!      A       A's local-to-parent = a, B's = b, etc.
//!     / \      D's joint-to-world = a c d
//!    B   C     D's world-to-joint = d^{-1} c^{-1} a^{-1}
//!       /
//!      D
//!
//! Two of these are cached on every joint: the world-to-joint transform in
//! the bind pose (computed once, see pose.rs) and the joint-to-world
//! transform in the current pose (recomputed whenever angles change). The
//! skinning equation in skinning.rs consumes both.

mod joint_tree;
mod pose;

pub use self::joint_tree::{build_skeleton, JointRecord};
pub use petgraph::graph::NodeIndex;

use cgmath::{Matrix3, Matrix4, One, Rad};
use errors::{ErrorKind, Result};
use petgraph::{Direction, Graph};

pub type JointTree = Graph<Joint, ()>;

pub struct Skeleton {
    /// Edges point from parent to child. Node i is the i-th declared joint.
    pub tree: JointTree,
    pub root: NodeIndex,
}

#[derive(Debug, Clone)]
pub struct Joint {
    /// Rotation block is set by `set_joint_angles`, translation is fixed at
    /// load time.
    pub local_to_parent: Matrix4<f64>,
    /// Ie. inverse bind matrix.
    pub bind_world_to_joint: Matrix4<f64>,
    pub current_joint_to_world: Matrix4<f64>,
}

impl Joint {
    pub fn new(local_to_parent: Matrix4<f64>) -> Joint {
        Joint {
            local_to_parent,
            bind_world_to_joint: Matrix4::one(),
            current_joint_to_world: Matrix4::one(),
        }
    }
}

impl Skeleton {
    pub fn num_joints(&self) -> usize {
        self.tree.node_count()
    }

    /// Checks a user-supplied joint index.
    pub fn node(&self, joint_idx: usize) -> Result<NodeIndex> {
        if joint_idx >= self.num_joints() {
            bail!(ErrorKind::JointOutOfBounds(joint_idx, self.num_joints()));
        }
        Ok(NodeIndex::new(joint_idx))
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.tree.neighbors_directed(node, Direction::Incoming).next()
    }

    /// Children of a joint, in the order they were declared.
    pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        children_of(&self.tree, node)
    }

    /// Number of joints on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn recur(skel: &Skeleton, node: NodeIndex) -> usize {
            1 + skel.children(node).into_iter()
                .map(|child| recur(skel, child))
                .max()
                .unwrap_or(0)
        }
        recur(self, self.root)
    }

    /// Replace the rotation of a joint's local transform with the Euler
    /// rotation Rz Ry Rx, keeping its translation.
    ///
    /// Nothing is propagated; call `update_current_joint_to_world_transforms`
    /// (and re-skin) afterwards.
    pub fn set_joint_angles(
        &mut self,
        joint_idx: usize,
        rx: Rad<f64>,
        ry: Rad<f64>,
        rz: Rad<f64>,
    ) -> Result<()> {
        let node = self.node(joint_idx)?;
        let rot = euler_zyx(rx, ry, rz);
        set_rotation(&mut self.tree[node].local_to_parent, &rot);
        Ok(())
    }

    /// Clear the rotation on every joint, returning to the bind pose.
    pub fn reset_pose(&mut self) {
        for joint in self.tree.node_weights_mut() {
            set_rotation(&mut joint.local_to_parent, &Matrix3::one());
        }
    }
}

pub fn euler_zyx(rx: Rad<f64>, ry: Rad<f64>, rz: Rad<f64>) -> Matrix3<f64> {
    Matrix3::from_angle_z(rz) * Matrix3::from_angle_y(ry) * Matrix3::from_angle_x(rx)
}

fn set_rotation(m: &mut Matrix4<f64>, rot: &Matrix3<f64>) {
    m.x = rot.x.extend(0.0);
    m.y = rot.y.extend(0.0);
    m.z = rot.z.extend(0.0);
}

fn children_of(tree: &JointTree, node: NodeIndex) -> Vec<NodeIndex> {
    // petgraph lists the most recently added edge first
    let mut children: Vec<NodeIndex> =
        tree.neighbors_directed(node, Direction::Outgoing).collect();
    children.reverse();
    children
}

#[cfg(test)]
use util::approx::mat_approx_eq;
#[cfg(test)]
use cgmath::{vec3, Deg, InnerSpace};

#[cfg(test)]
fn record(x: f64, y: f64, z: f64, parent: Option<usize>) -> JointRecord {
    JointRecord { translation: vec3(x, y, z), parent }
}

#[test]
fn test_zero_angles_leave_transform_unchanged() {
    let mut skel = build_skeleton(&[
        record(0.0, 0.0, 0.0, None),
        record(1.0, 2.0, 3.0, Some(0)),
    ]).unwrap();
    let before = skel.tree[NodeIndex::new(1)].local_to_parent;
    skel.set_joint_angles(1, Rad(0.0), Rad(0.0), Rad(0.0)).unwrap();
    assert!(mat_approx_eq(&skel.tree[NodeIndex::new(1)].local_to_parent, &before));
}

#[test]
fn test_set_angles_keeps_translation() {
    let mut skel = build_skeleton(&[record(4.0, 5.0, 6.0, None)]).unwrap();
    skel.set_joint_angles(0, Deg(30.0).into(), Deg(-45.0).into(), Deg(90.0).into()).unwrap();
    let m = skel.tree[skel.root].local_to_parent;
    assert_eq!(m.w, vec3(4.0, 5.0, 6.0).extend(1.0));
    let rot = euler_zyx(Deg(30.0).into(), Deg(-45.0).into(), Deg(90.0).into());
    assert_eq!(m.x, rot.x.extend(0.0));
    assert_eq!(m.z, rot.z.extend(0.0));
}

#[test]
fn test_euler_order_is_z_y_x() {
    // Rx(90) sends +Y to +Z, then Rz(90) sends +Z to +Z. With the other
    // order +Y would go to -X first and then stay in the XY plane.
    let rot = euler_zyx(Deg(90.0).into(), Rad(0.0), Deg(90.0).into());
    let v = rot * vec3(0.0, 1.0, 0.0);
    assert!((v - vec3(0.0, 0.0, 1.0)).magnitude() < 1e-9);
}

#[test]
fn test_set_angles_out_of_bounds() {
    let mut skel = build_skeleton(&[record(0.0, 0.0, 0.0, None)]).unwrap();
    let err = skel.set_joint_angles(3, Rad(0.1), Rad(0.0), Rad(0.0)).unwrap_err();
    match *err.kind() {
        ErrorKind::JointOutOfBounds(3, 1) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_reset_pose() {
    let mut skel = build_skeleton(&[
        record(0.0, 0.0, 0.0, None),
        record(0.0, 1.0, 0.0, Some(0)),
    ]).unwrap();
    let bind = skel.tree[NodeIndex::new(1)].local_to_parent;
    skel.set_joint_angles(1, Rad(0.3), Rad(0.2), Rad(0.1)).unwrap();
    skel.reset_pose();
    assert!(mat_approx_eq(&skel.tree[NodeIndex::new(1)].local_to_parent, &bind));
}

#[test]
fn test_depth_and_children() {
    let skel = build_skeleton(&[
        record(0.0, 0.0, 0.0, None),
        record(1.0, 0.0, 0.0, Some(0)),
        record(0.0, 1.0, 0.0, Some(0)),
        record(0.0, 1.0, 0.0, Some(2)),
    ]).unwrap();
    assert_eq!(skel.depth(), 3);
    assert_eq!(skel.children(skel.root), vec![NodeIndex::new(1), NodeIndex::new(2)]);
    assert_eq!(skel.parent(NodeIndex::new(3)), Some(NodeIndex::new(2)));
    assert_eq!(skel.parent(skel.root), None);
}
