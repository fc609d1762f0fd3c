use super::{BvhNodeId, BvhNodeKind, BvhNodes};

/// Refreshes parent links, depths and container bounds of the tree rooted at
/// `root_id`, putting the child with the larger surface area on the left.
pub fn link(nodes: &mut BvhNodes, root_id: BvhNodeId) {
    nodes[root_id].parent = None;
    nodes[root_id].depth = 0;

    let mut preorder = Vec::with_capacity(nodes.len());
    let mut stack = vec![root_id];

    while let Some(id) = stack.pop() {
        preorder.push(id);

        if let Some((left_id, right_id)) = nodes[id].children() {
            let depth = nodes[id].depth + 1;

            for child_id in [left_id, right_id] {
                nodes[child_id].parent = Some(id);
                nodes[child_id].depth = depth;
                stack.push(child_id);
            }
        }
    }

    // Children always come after their parent in `preorder`
    for &id in preorder.iter().rev() {
        let Some((left_id, right_id)) = nodes[id].children() else {
            continue;
        };

        nodes[id].bounds = nodes[left_id].bounds + nodes[right_id].bounds;

        if nodes[right_id].bounds.surface_area()
            > nodes[left_id].bounds.surface_area()
        {
            nodes[id].kind = BvhNodeKind::Internal {
                left_id: right_id,
                right_id: left_id,
            };
        }
    }
}

/// Returns ids in the order a stackless traversal visits them: descend left
/// first, and once a subtree is exhausted climb over parent links up to the
/// nearest left child and continue with its sibling.
pub fn traversal_order(nodes: &BvhNodes, root_id: BvhNodeId) -> Vec<BvhNodeId> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut id = root_id;

    loop {
        order.push(id);

        if let Some((left_id, _)) = nodes[id].children() {
            id = left_id;
            continue;
        }

        loop {
            let Some(parent_id) = nodes[id].parent else {
                return order;
            };

            match nodes[parent_id].children() {
                Some((left_id, right_id)) if left_id == id => {
                    id = right_id;
                    break;
                }
                _ => {
                    id = parent_id;
                }
            }
        }
    }
}

/// Rebuilds the arena so that node ids follow `order`; returns the new arena
/// and a table mapping old ids to new ones.
pub fn relabel(
    mut nodes: BvhNodes,
    order: &[BvhNodeId],
) -> (BvhNodes, Vec<BvhNodeId>) {
    let mut new_ids = vec![BvhNodeId::new(u32::MAX); nodes.len()];

    for (new_id, old_id) in order.iter().enumerate() {
        new_ids[old_id.get() as usize] = BvhNodeId::new(new_id as u32);
    }

    let new_id = |id: BvhNodeId| new_ids[id.get() as usize];

    let relabelled = order
        .iter()
        .map(|&old_id| {
            let mut node = nodes.take(old_id);

            node.parent = node.parent.map(new_id);

            if let BvhNodeKind::Internal { left_id, right_id } = &mut node.kind
            {
                *left_id = new_id(*left_id);
                *right_id = new_id(*right_id);
            }

            node
        })
        .collect();

    (relabelled, new_ids)
}
