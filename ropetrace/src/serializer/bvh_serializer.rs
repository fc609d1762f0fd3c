use std::collections::BTreeMap;

use crate::{gpu, Bvh, BvhNodeKind};

/// Flattens the BVH; `kd_roots` maps leaves standing for k-d trees onto the
/// global ids of those trees' roots.
///
/// Nodes are already stored in traversal order, so ids are kept as-is.
pub fn run(
    bvh: &Bvh,
    kd_roots: &BTreeMap<u32, u32>,
    nodes: &mut Vec<gpu::BvhNode>,
    faces: &mut Vec<u32>,
) {
    nodes.clear();
    faces.clear();

    for (id, node) in bvh.nodes().iter() {
        let bb_min = node.bounds.min();
        let bb_max = node.bounds.max();

        let parent_id = node
            .parent
            .map_or(gpu::INVALID_ID, |parent_id| parent_id.get());

        let node = match &node.kind {
            BvhNodeKind::Internal { left_id, right_id } => {
                gpu::BvhNode::internal(
                    bb_min,
                    bb_max,
                    left_id.get(),
                    right_id.get(),
                    parent_id,
                    node.skips_to_here,
                    node.skip_next_left,
                )
            }

            BvhNodeKind::Leaf {
                object_id,
                triangles,
            } => {
                if let Some(&kd_root) = kd_roots.get(&id.get()) {
                    gpu::BvhNode::leaf(
                        bb_min,
                        bb_max,
                        kd_root,
                        0,
                        parent_id,
                        node.skips_to_here,
                        object_id.get(),
                        true,
                    )
                } else {
                    let faces_offset = faces.len() as u32;

                    faces.extend(triangles.iter().map(|tri| tri.id().get()));

                    gpu::BvhNode::leaf(
                        bb_min,
                        bb_max,
                        faces_offset,
                        triangles.len() as u32,
                        parent_id,
                        node.skips_to_here,
                        object_id.get(),
                        false,
                    )
                }
            }
        };

        nodes.push(node);
    }
}
