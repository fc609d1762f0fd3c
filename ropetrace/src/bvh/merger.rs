//! Joins per-object subtrees under container nodes.

use super::{BvhNode, BvhNodeId, BvhNodes};
use crate::{BoundingBox, DiagnosticKind, Diagnostics};

/// Moves all subtrees into one arena and groups their roots under container
/// nodes; returns the new root and, for each subtree, where its root landed.
pub fn run(
    subtrees: Vec<BvhNodes>,
    diagnostics: &mut Diagnostics,
) -> (BvhNodes, BvhNodeId, Vec<BvhNodeId>) {
    debug_assert!(!subtrees.is_empty());

    let mut nodes = BvhNodes::default();

    let roots: Vec<_> = subtrees
        .into_iter()
        .map(|subtree| nodes.append(subtree))
        .collect();

    if roots.len() == 1 {
        return (nodes, roots[0], roots);
    }

    let root_id = nodes.add(BvhNode::default());
    let mut stack = vec![(root_id, roots.clone())];

    while let Some((id, group)) = stack.pop() {
        let (left, right) = partition(&nodes, group, diagnostics);

        let mut adopt = |group: Vec<BvhNodeId>, stack: &mut Vec<_>| {
            if let [id] = group[..] {
                id
            } else {
                let id = nodes.add(BvhNode::default());

                stack.push((id, group));
                id
            }
        };

        let right_id = adopt(right, &mut stack);
        let left_id = adopt(left, &mut stack);

        nodes[id] = BvhNode::internal(BoundingBox::default(), left_id, right_id);
    }

    (nodes, root_id, roots)
}

/// Splits a group of (at least two) subtree roots in two at the mean box
/// center along the group's longest axis.
fn partition(
    nodes: &BvhNodes,
    group: Vec<BvhNodeId>,
    diagnostics: &mut Diagnostics,
) -> (Vec<BvhNodeId>, Vec<BvhNodeId>) {
    let bounds: BoundingBox = group.iter().map(|&id| nodes[id].bounds).collect();
    let axis = bounds.longest_axis();

    let mean = group
        .iter()
        .map(|&id| nodes[id].bounds.center()[axis])
        .sum::<f32>()
        / (group.len() as f32);

    let (left, right): (Vec<_>, Vec<_>) = group
        .iter()
        .copied()
        .partition(|&id| nodes[id].bounds.center()[axis] < mean);

    if !left.is_empty() && !right.is_empty() {
        return (left, right);
    }

    diagnostics.push(
        log::Level::Warn,
        DiagnosticKind::StructuralFallback,
        None,
        format!(
            "{} objects share the same center along {}; halving the group \
             instead",
            group.len(),
            axis,
        ),
    );

    let mut left = group;
    let right = left.split_off(left.len() / 2);

    (left, right)
}
