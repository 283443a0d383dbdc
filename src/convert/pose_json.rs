//! Dump a posed model as JSON: the joint tree with its current transforms,
//! and the skinned vertex positions.

use cgmath::Matrix4;
use json::JsonValue;
use model::SkeletalModel;

/// Column-major, like glTF.
fn matrix(m: &Matrix4<f64>) -> JsonValue {
    let mut v = Vec::with_capacity(16);
    for c in 0..4 {
        for r in 0..4 {
            v.push(m[c][r]);
        }
    }
    v.into()
}

pub fn to_json(model: &SkeletalModel) -> JsonValue {
    let skel = &model.skeleton;
    let mesh = &model.mesh;

    let mut joints = JsonValue::new_array();
    for node in skel.tree.node_indices() {
        let joint = &skel.tree[node];
        let parent = match skel.parent(node) {
            Some(p) => p.index().into(),
            None => JsonValue::Null,
        };
        let children: Vec<usize> = skel.children(node).iter().map(|c| c.index()).collect();
        let t = joint.local_to_parent.w;
        let _ = joints.push(object!(
            "index" => node.index(),
            "parent" => parent,
            "children" => children,
            "translation" => vec![t.x, t.y, t.z],
            "localToParent" => matrix(&joint.local_to_parent),
            "currentJointToWorld" => matrix(&joint.current_joint_to_world),
        ));
    }

    let mut vertices = JsonValue::new_array();
    for v in &mesh.current_vertices {
        let _ = vertices.push(vec![v.x, v.y, v.z]);
    }

    let mut faces = JsonValue::new_array();
    for face in &mesh.faces {
        let _ = faces.push(vec![face[0], face[1], face[2]]);
    }

    object!(
        "generator" => format!("skelskin {}", env!("CARGO_PKG_VERSION")),
        "root" => skel.root.index(),
        "joints" => joints,
        "vertices" => vertices,
        "faces" => faces,
    )
}

#[test]
fn test_pose_json() {
    use files;

    let records = files::parse_skeleton("0 0 0 -1\n0 0 1 0\n0 2 0 0\n").unwrap();
    let mesh = files::parse_mesh("v 1 2 3\n").unwrap();
    let attachments = files::parse_attachments("1\n", 3).unwrap();
    let model = SkeletalModel::from_parts(&records, mesh, attachments).unwrap();

    let json = to_json(&model);
    assert_eq!(json["root"].as_usize(), Some(0));
    assert_eq!(json["joints"].len(), 3);
    assert!(json["joints"][0]["parent"].is_null());
    assert_eq!(json["joints"][2]["parent"].as_usize(), Some(0));
    assert_eq!(json["joints"][0]["children"].len(), 2);
    assert_eq!(json["joints"][0]["children"][1].as_usize(), Some(2));
    // translation column of joint 2's current transform
    assert_eq!(json["joints"][2]["currentJointToWorld"][13].as_f64(), Some(2.0));
    assert_eq!(json["vertices"][0][2].as_f64(), Some(3.0));
}
