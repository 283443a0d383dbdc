//! Transform propagation through the joint tree.
//!
//! Both passes are the same depth-first walk: push the joint's
//! local-to-parent onto a matrix stack, read the accumulated root-to-joint
//! transform off the top, recurse, pop.

use cgmath::{Matrix4, One, SquareMatrix};
use util::matrix_stack::MatrixStack;
use super::{children_of, Joint, JointTree, NodeIndex, Skeleton};

impl Skeleton {
    /// Compute every joint's world-to-joint transform in the bind pose.
    ///
    /// There is only one bind pose, so this runs once, right after loading
    /// and before any angles are set.
    pub fn compute_bind_world_to_joint_transforms(&mut self) {
        let root = self.root;
        let mut stack = MatrixStack::new();
        walk(&mut self.tree, &mut stack, root, &mut |joint: &mut Joint, joint_to_world: Matrix4<f64>| {
            joint.bind_world_to_joint = invert_or_identity(joint_to_world);
        });
        debug_assert_eq!(stack.depth(), 0);
    }

    /// Compute every joint's joint-to-world transform in the current pose.
    ///
    /// A rotation on any joint moves its whole subtree, so this always redoes
    /// the full tree.
    pub fn update_current_joint_to_world_transforms(&mut self) {
        let root = self.root;
        let mut stack = MatrixStack::new();
        walk(&mut self.tree, &mut stack, root, &mut |joint: &mut Joint, joint_to_world: Matrix4<f64>| {
            joint.current_joint_to_world = joint_to_world;
        });
        debug_assert_eq!(stack.depth(), 0);
    }
}

fn walk<F>(tree: &mut JointTree, stack: &mut MatrixStack, node: NodeIndex, visit: &mut F)
where F: FnMut(&mut Joint, Matrix4<f64>) {
    let local_to_parent = tree[node].local_to_parent;
    stack.with_pushed(local_to_parent, |stack| {
        visit(&mut tree[node], stack.top());
        for child in children_of(tree, node) {
            walk(tree, stack, child, visit);
        }
    });
}

fn invert_or_identity(m: Matrix4<f64>) -> Matrix4<f64> {
    match m.invert() {
        Some(inv) => inv,
        None => {
            warn!("found singular bind transform; using the identity instead. \
                The skin may look wrong.");
            debug!("namely, the matrix {:#?}", m);
            Matrix4::one()
        }
    }
}

#[cfg(test)]
use util::approx::mat_approx_eq;
#[cfg(test)]
use cgmath::{vec3, Deg, Rad};
#[cfg(test)]
use super::{build_skeleton, JointRecord};

#[cfg(test)]
fn chain() -> Skeleton {
    build_skeleton(&[
        JointRecord { translation: vec3(0.5, 0.0, 0.0), parent: None },
        JointRecord { translation: vec3(0.0, 1.0, 0.0), parent: Some(0) },
        JointRecord { translation: vec3(0.0, 0.0, 2.0), parent: Some(1) },
        JointRecord { translation: vec3(1.0, 1.0, 1.0), parent: Some(0) },
    ]).unwrap()
}

#[test]
fn test_bind_inverts_accumulated_transform() {
    let mut skel = chain();
    skel.compute_bind_world_to_joint_transforms();
    skel.update_current_joint_to_world_transforms();
    for joint in skel.tree.node_weights_mut() {
        let prod = joint.bind_world_to_joint * joint.current_joint_to_world;
        assert!(mat_approx_eq(&prod, &Matrix4::one()));
    }
    let leaf = &skel.tree[NodeIndex::new(2)];
    assert!(mat_approx_eq(
        &leaf.current_joint_to_world,
        &Matrix4::from_translation(vec3(0.5, 1.0, 2.0)),
    ));
}

#[test]
fn test_bind_unaffected_by_later_angles() {
    let mut skel = chain();
    skel.compute_bind_world_to_joint_transforms();
    let bind = skel.tree[NodeIndex::new(2)].bind_world_to_joint;
    skel.set_joint_angles(0, Deg(40.0).into(), Rad(0.0), Rad(0.0)).unwrap();
    skel.update_current_joint_to_world_transforms();
    assert!(mat_approx_eq(&skel.tree[NodeIndex::new(2)].bind_world_to_joint, &bind));
}

#[test]
fn test_parent_rotation_moves_descendants() {
    let mut skel = chain();
    skel.set_joint_angles(1, Rad(0.0), Rad(0.0), Deg(90.0).into()).unwrap();
    skel.update_current_joint_to_world_transforms();

    // Joint 2 is rotated along with joint 1, joint 3 (a sibling branch) isn't
    let expected2 = Matrix4::from_translation(vec3(0.5, 1.0, 0.0))
        * Matrix4::from_angle_z(Deg(90.0))
        * Matrix4::from_translation(vec3(0.0, 0.0, 2.0));
    assert!(mat_approx_eq(&skel.tree[NodeIndex::new(2)].current_joint_to_world, &expected2));
    assert!(mat_approx_eq(
        &skel.tree[NodeIndex::new(3)].current_joint_to_world,
        &Matrix4::from_translation(vec3(1.5, 1.0, 1.0)),
    ));
}
