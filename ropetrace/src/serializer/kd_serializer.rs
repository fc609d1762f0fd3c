use crate::{gpu, KdNode, KdTree};

/// Appends given tree to the flattened k-d arrays; returns the global id its
/// root got.
///
/// Node ids (including ropes) are rebased by the number of nodes already in
/// `nodes`, so that all trees of a scene can share a single buffer.
pub fn run(
    tree: &KdTree,
    nodes: &mut Vec<gpu::KdNode>,
    ropes: &mut Vec<u32>,
    faces: &mut Vec<u32>,
) -> u32 {
    let offset = nodes.len() as u32;

    for (_, node) in tree.nodes().iter() {
        let bounds = node.bounds();
        let (bb_min, bb_max) = (bounds.min(), bounds.max());

        let node = match node {
            KdNode::Internal {
                axis,
                split,
                left_id,
                right_id,
                ..
            } => gpu::KdNode::internal(
                bb_min,
                bb_max,
                axis.get() as u32,
                *split,
                offset + left_id.get(),
                offset + right_id.get(),
            ),

            KdNode::Leaf {
                triangles,
                ropes: leaf_ropes,
                ..
            } => {
                let ropes_offset = ropes.len() as u32;
                let faces_offset = faces.len() as u32;

                ropes.extend(leaf_ropes.iter().map(|(_, rope)| {
                    rope.map_or(gpu::INVALID_ID, |rope| offset + rope.get())
                }));

                faces.extend(triangles.iter().map(|tri| tri.id().get()));

                gpu::KdNode::leaf(
                    bb_min,
                    bb_max,
                    ropes_offset,
                    faces_offset,
                    triangles.len() as u32,
                )
            }
        };

        nodes.push(node);
    }

    offset
}
