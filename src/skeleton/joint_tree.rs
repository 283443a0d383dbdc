//! Build the joint tree from the records of a skeleton file.
//!
//! Records come in declaration order and a joint may only name a parent that
//! was declared before it, so declaration order is a topological order of
//! the tree. That also means the first record has to be the root.

use cgmath::{Matrix4, Vector3};
use errors::{ErrorKind, Result};
use super::{Joint, JointTree, NodeIndex, Skeleton};

/// One line of a skeleton file.
#[derive(Debug, Clone, PartialEq)]
pub struct JointRecord {
    /// Offset from the parent joint in the bind pose.
    pub translation: Vector3<f64>,
    /// None for the root.
    pub parent: Option<usize>,
}

pub fn build_skeleton(records: &[JointRecord]) -> Result<Skeleton> {
    if records.is_empty() {
        bail!(ErrorKind::EmptySkeleton);
    }

    let num_edges = records.len() - 1;
    let mut tree = JointTree::with_capacity(records.len(), num_edges);
    let mut root: Option<NodeIndex> = None;

    for (joint_idx, record) in records.iter().enumerate() {
        let node = tree.add_node(Joint::new(Matrix4::from_translation(record.translation)));
        debug_assert_eq!(node.index(), joint_idx);

        match record.parent {
            None => {
                if let Some(old_root) = root {
                    bail!(ErrorKind::BadHierarchy(format!(
                        "joints {} and {} are both roots",
                        old_root.index(), joint_idx,
                    )));
                }
                root = Some(node);
            }
            Some(parent_idx) => {
                if parent_idx >= joint_idx {
                    bail!(ErrorKind::BadHierarchy(format!(
                        "joint {} has parent {}, which isn't declared before it",
                        joint_idx, parent_idx,
                    )));
                }
                tree.add_edge(NodeIndex::new(parent_idx), node, ());
            }
        }
    }

    let root = match root {
        Some(root) => root,
        None => bail!(ErrorKind::BadHierarchy("no root joint".to_string())),
    };

    trace!("built skeleton with {} joints", tree.node_count());

    Ok(Skeleton { tree, root })
}

#[cfg(test)]
use cgmath::vec3;

#[cfg(test)]
fn record(parent: Option<usize>) -> JointRecord {
    JointRecord { translation: vec3(0.0, 1.0, 0.0), parent }
}

#[test]
fn test_every_joint_reachable_from_root() {
    use petgraph::visit::Dfs;

    let skel = build_skeleton(&[
        record(None),
        record(Some(0)),
        record(Some(1)),
        record(Some(0)),
        record(Some(3)),
        record(Some(3)),
    ]).unwrap();

    assert_eq!(skel.root, NodeIndex::new(0));

    let mut seen = vec![false; skel.num_joints()];
    let mut dfs = Dfs::new(&skel.tree, skel.root);
    while let Some(node) = dfs.next(&skel.tree) {
        assert!(!seen[node.index()]);
        seen[node.index()] = true;
    }
    assert!(seen.iter().all(|&x| x));

    // Exactly one parent for everything but the root
    for node in skel.tree.node_indices() {
        let num_parents = skel.tree
            .neighbors_directed(node, ::petgraph::Direction::Incoming)
            .count();
        let expected = if node == skel.root { 0 } else { 1 };
        assert_eq!(num_parents, expected);
    }
}

#[test]
fn test_local_transform_is_translation() {
    let skel = build_skeleton(&[JointRecord {
        translation: vec3(1.0, -2.0, 0.5),
        parent: None,
    }]).unwrap();
    let m = skel.tree[skel.root].local_to_parent;
    assert_eq!(m, Matrix4::from_translation(vec3(1.0, -2.0, 0.5)));
}

#[test]
fn test_empty_skeleton() {
    let err = build_skeleton(&[]).err().unwrap();
    match *err.kind() {
        ErrorKind::EmptySkeleton => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_two_roots() {
    let err = build_skeleton(&[record(None), record(Some(0)), record(None)]).err().unwrap();
    match *err.kind() {
        ErrorKind::BadHierarchy(_) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn test_forward_parent_reference() {
    let err = build_skeleton(&[record(None), record(Some(2)), record(Some(0))]).err().unwrap();
    match *err.kind() {
        ErrorKind::BadHierarchy(_) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }

    // A joint can't be its own parent either
    let err = build_skeleton(&[record(None), record(Some(1))]).err().unwrap();
    match *err.kind() {
        ErrorKind::BadHierarchy(_) => (),
        ref kind => panic!("unexpected error {:?}", kind),
    }
}
