//! `info` subcommand: print what's in a set of model files.

use clap::ArgMatches;
use errors::Result;
use model::SkeletalModel;
use skinning::WEIGHT_EPSILON;

/// Weight sums further than this from 1 get reported.
static WEIGHT_SUM_TOLERANCE: f64 = 1e-3;
/// Don't list more than this many problem vertices.
static MAX_LISTED: usize = 10;

pub fn main(matches: &ArgMatches) -> Result<()> {
    let model = SkeletalModel::from_arg_matches(matches)?;
    skeleton_info(&model);
    mesh_info(&model);
    Ok(())
}

fn skeleton_info(model: &SkeletalModel) {
    let skel = &model.skeleton;
    println!("Skeleton:");
    println!("  Num Joints: {}", skel.num_joints());
    println!("  Depth: {}", skel.depth());
    println!("  Joints:");
    for node in skel.tree.node_indices() {
        let joint = &skel.tree[node];
        let t = joint.local_to_parent.w;
        let p = joint.current_joint_to_world.w;
        print!("    Joint {}: offset ({}, {}, {}), at ({}, {}, {})",
            node.index(), t.x, t.y, t.z, p.x, p.y, p.z);
        match skel.parent(node) {
            Some(parent) => print!(", parent {}", parent.index()),
            None => print!(", root"),
        }
        let children = skel.children(node);
        if !children.is_empty() {
            let list: Vec<String> = children.iter().map(|c| c.index().to_string()).collect();
            print!(", children {}", list.join(" "));
        }
        println!();
    }
}

fn mesh_info(model: &SkeletalModel) {
    let mesh = &model.mesh;
    println!("Mesh:");
    println!("  Num Vertices: {}", mesh.num_vertices());
    println!("  Num Triangles: {}", mesh.faces.len());

    // How many vertices each joint influences
    let mut influenced = vec![0; mesh.num_joints()];
    for row in &mesh.attachments {
        for (ji, &w) in row.iter().enumerate() {
            if w > WEIGHT_EPSILON {
                influenced[ji] += 1;
            }
        }
    }
    println!("  Influenced Vertices Per Joint:");
    for (ji, count) in influenced.iter().enumerate() {
        println!("    Joint {}: {}", ji, count);
    }

    let unnormalized = mesh.unnormalized_vertices(WEIGHT_SUM_TOLERANCE);
    if !unnormalized.is_empty() {
        warn!("{} vertices have weights that don't sum to 1; they will be \
            scaled when skinned", unnormalized.len());
        for &vi in unnormalized.iter().take(MAX_LISTED) {
            info!("  vertex {}: weights sum to {}", vi, mesh.weight_sum(vi));
        }
    }

    let unattached: Vec<usize> = mesh.attachments.iter()
        .enumerate()
        .filter(|&(_, row)| row.iter().all(|&w| w <= WEIGHT_EPSILON))
        .map(|(vi, _)| vi)
        .collect();
    if !unattached.is_empty() {
        warn!("{} vertices aren't attached to any joint; skinning will \
            move them to the origin", unattached.len());
        for &vi in unattached.iter().take(MAX_LISTED) {
            info!("  vertex {}", vi);
        }
    }
}
